//! Configuration loading, env substitution, and validation.
//!
//! Config files: `framecast.toml`, `framecast.yaml`, or `framecast.json`
//! Searched in `./` then `~/.config/framecast/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw file.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        config_dir, discover_and_load, find_config_file, find_or_default_config_path,
        load_config, load_or_discover, save_config, write_default_config,
    },
    schema::{
        ApiConfig, FramecastConfig, ImageConfig, OutputConfig, PollingConfig, VideoConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult},
};
