//! Shared error-context plumbing and media-type helpers used across the framecast crates.

pub mod error;
pub mod mime;

pub use {error::FromMessage, mime::MediaKind};
