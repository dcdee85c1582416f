//! Media-generation provider abstraction.

mod gemini;

pub use gemini::GeminiProvider;

use {
    async_trait::async_trait,
    bytes::Bytes,
    serde::{Deserialize, Serialize},
};

use crate::{
    error::Result,
    payload::{ImagePayload, VideoPayload},
    types::ImageOutput,
};

/// A long-running video job as reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Resource name used to re-fetch the operation, e.g. `models/veo/operations/abc`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: GenerateVideoResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
    /// Safety-filter explanations when samples were withheld.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<GeneratedVideo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Bytes fetched from a result URI.
#[derive(Debug, Clone)]
pub struct DownloadedMedia {
    pub data: Bytes,
    /// `Content-Type` reported by the server, if any.
    pub mime_type: Option<String>,
}

/// Image and video generation backend.
///
/// Video generation is asynchronous: `start_video` submits a job and the
/// caller re-fetches it with `get_operation` until `done` is set.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Provider identifier (e.g., "gemini").
    fn id(&self) -> &'static str;

    /// Human-readable provider name.
    fn name(&self) -> &'static str;

    /// Whether credentials are available.
    fn is_configured(&self) -> bool;

    /// Generate a single image and return the decoded bytes.
    async fn generate_image(&self, model: &str, payload: &ImagePayload) -> Result<ImageOutput>;

    /// Submit a video job.
    async fn start_video(&self, model: &str, payload: &VideoPayload) -> Result<Operation>;

    /// Re-fetch a job by its resource name.
    async fn get_operation(&self, name: &str) -> Result<Operation>;

    /// Fetch a finished asset.
    async fn download(&self, uri: &str) -> Result<DownloadedMedia>;
}
