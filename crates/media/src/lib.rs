//! Media helpers: load and normalise reference images, write generated assets to disk.

pub mod error;
pub mod images;
pub mod store;

pub use {
    error::{Error, Result},
    images::{LoadedImage, load_image, normalize_image},
    store::{load_sidecar, save_asset, save_sidecar, sidecar_path},
};
