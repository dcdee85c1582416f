//! Image and video generation against a remote generative-media API.
//!
//! A video request is shaped by its [`GenerationMode`]: the mode decides which
//! media inputs are required, which are dropped, and how they map onto the
//! request payload. Video jobs run as long-running operations that
//! [`Studio`] polls on a fixed interval until they finish, then downloads.

pub mod error;
pub mod payload;
pub mod poll;
pub mod provider;
pub mod studio;
pub mod types;
pub mod validate;

#[cfg(test)]
mod testing;

pub use {
    error::{Error, Result},
    poll::{PollConfig, wait_for_operation},
    provider::{DownloadedMedia, GeminiProvider, MediaProvider, Operation},
    studio::{Studio, StudioEvent},
    types::{
        AspectRatio, GenerateImageParams, GenerateVideoParams, GenerationMode, ImageFile,
        ImageOutput, Resolution, VideoHandle, VideoOutput,
    },
};
