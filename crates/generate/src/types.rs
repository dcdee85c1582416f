//! Request and result types shared by the payload builder, providers, and [`Studio`](crate::Studio).

use std::{fmt, str::FromStr};

use {
    bytes::Bytes,
    serde::{Deserialize, Serialize},
};

use crate::error::Error;

/// Fast Veo model, the default for most modes.
pub const VEO_FAST_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Full-quality Veo model. Required for references-to-video.
pub const VEO_MODEL: &str = "veo-3.1-generate-preview";

/// Default still-image model.
pub const IMAGEN_MODEL: &str = "imagen-4.0-generate-001";

/// Maximum number of reference assets per references-to-video request.
pub const MAX_REFERENCE_IMAGES: usize = 3;

/// Which media inputs a video request is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Prompt only.
    #[default]
    TextToVideo,
    /// Start frame, optional end frame (or the start frame again when looping).
    FramesToVideo,
    /// Prompt plus up to three asset images and an optional style image.
    ReferencesToVideo,
    /// Continue a video produced by an earlier job.
    ExtendVideo,
}

impl GenerationMode {
    pub const ALL: [Self; 4] = [
        Self::TextToVideo,
        Self::FramesToVideo,
        Self::ReferencesToVideo,
        Self::ExtendVideo,
    ];

    /// Short CLI / log name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextToVideo => "text",
            Self::FramesToVideo => "frames",
            Self::ReferencesToVideo => "references",
            Self::ExtendVideo => "extend",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "text" | "text-to-video" => Ok(Self::TextToVideo),
            "frames" | "frames-to-video" => Ok(Self::FramesToVideo),
            "references" | "references-to-video" => Ok(Self::ReferencesToVideo),
            "extend" | "extend-video" => Ok(Self::ExtendVideo),
            other => Err(Error::invalid_request(format!(
                "unknown generation mode \"{other}\" (expected text, frames, references, or extend)"
            ))),
        }
    }
}

/// Output frame shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    /// Image generation only.
    #[serde(rename = "1:1")]
    Square,
    /// Image generation only.
    #[serde(rename = "4:3")]
    Standard,
    /// Image generation only.
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Standard => "4:3",
            Self::StandardPortrait => "3:4",
        }
    }

    /// Whether the video endpoint accepts this ratio.
    #[must_use]
    pub fn supports_video(&self) -> bool {
        matches!(self, Self::Landscape | Self::Portrait)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "16:9" | "landscape" => Ok(Self::Landscape),
            "9:16" | "portrait" => Ok(Self::Portrait),
            "1:1" | "square" => Ok(Self::Square),
            "4:3" => Ok(Self::Standard),
            "3:4" => Ok(Self::StandardPortrait),
            other => Err(Error::invalid_request(format!(
                "unknown aspect ratio \"{other}\""
            ))),
        }
    }
}

/// Output video resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "720p" | "720" => Ok(Self::P720),
            "1080p" | "1080" => Ok(Self::P1080),
            other => Err(Error::invalid_request(format!(
                "unknown resolution \"{other}\" (expected 720p or 1080p)"
            ))),
        }
    }
}

/// Raw image bytes plus MIME type, sent inline as base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub data: Bytes,
    pub mime_type: String,
}

impl ImageFile {
    #[must_use]
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Handle to a video produced by an earlier job.
///
/// Opaque to callers; persisted as JSON so a later run can extend the video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoHandle {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl VideoHandle {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
        }
    }
}

/// Everything a video request can carry. Which fields are used depends on `mode`.
#[derive(Debug, Clone)]
pub struct GenerateVideoParams {
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub mode: GenerationMode,
    pub start_frame: Option<ImageFile>,
    pub end_frame: Option<ImageFile>,
    /// Reuse the start frame as the last frame.
    pub is_looping: bool,
    pub reference_images: Vec<ImageFile>,
    pub style_image: Option<ImageFile>,
    pub input_video: Option<VideoHandle>,
}

impl Default for GenerateVideoParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: VEO_FAST_MODEL.into(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            mode: GenerationMode::default(),
            start_frame: None,
            end_frame: None,
            is_looping: false,
            reference_images: Vec::new(),
            style_image: None,
            input_video: None,
        }
    }
}

impl GenerateVideoParams {
    /// Trimmed prompt, or `None` when blank.
    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        Some(self.prompt.trim()).filter(|p| !p.is_empty())
    }
}

/// A still-image request.
#[derive(Debug, Clone)]
pub struct GenerateImageParams {
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: AspectRatio,
    /// `image/jpeg` or `image/png`.
    pub output_mime_type: String,
}

impl Default for GenerateImageParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: IMAGEN_MODEL.into(),
            aspect_ratio: AspectRatio::default(),
            output_mime_type: "image/jpeg".into(),
        }
    }
}

/// Decoded image returned by the API.
#[derive(Debug, Clone)]
pub struct ImageOutput {
    pub data: Bytes,
    pub mime_type: String,
}

/// Downloaded video and the handle that produced it.
#[derive(Debug, Clone)]
pub struct VideoOutput {
    pub data: Bytes,
    pub mime_type: String,
    pub handle: VideoHandle,
}
