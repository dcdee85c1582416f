//! Request bodies for the `:predict` and `:predictLongRunning` endpoints.

use {
    base64::Engine,
    serde::{Deserialize, Serialize},
};

use crate::{
    error::{Error, Result},
    types::{GenerateImageParams, GenerateVideoParams, GenerationMode, ImageFile},
    validate::EXTEND_REQUIRES_VIDEO,
};

/// An image sent inline as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

impl From<&ImageFile> for InlineImage {
    fn from(file: &ImageFile) -> Self {
        Self {
            bytes_base64_encoded: base64::engine::general_purpose::STANDARD.encode(&file.data),
            mime_type: file.mime_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Asset,
    Style,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    pub image: InlineImage,
    pub reference_type: ReferenceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInstance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_frame: Option<InlineImage>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reference_images: Vec<ReferenceImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    pub resolution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPayload {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

impl VideoPayload {
    /// The single instance this crate ever sends.
    #[must_use]
    pub fn instance(&self) -> Option<&VideoInstance> {
        self.instances.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInstance {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
    pub output_mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub instances: Vec<ImageInstance>,
    pub parameters: ImageParameters,
}

/// Map `params.mode` onto the video request body.
///
/// Only inputs belonging to the mode are read. Extend-video leaves the
/// aspect ratio unset since the output follows the input video.
pub fn build_video_payload(params: &GenerateVideoParams) -> Result<VideoPayload> {
    let mut instance = VideoInstance {
        prompt: params.prompt_text().map(str::to_owned),
        ..Default::default()
    };
    let mut aspect_ratio = Some(params.aspect_ratio.as_str().to_owned());

    match params.mode {
        GenerationMode::TextToVideo => {},
        GenerationMode::FramesToVideo => {
            instance.image = params.start_frame.as_ref().map(InlineImage::from);
            let last = if params.is_looping {
                params.start_frame.as_ref()
            } else {
                params.end_frame.as_ref()
            };
            instance.last_frame = last.map(InlineImage::from);
        },
        GenerationMode::ReferencesToVideo => {
            instance.reference_images = params
                .reference_images
                .iter()
                .map(|img| ReferenceImage {
                    image: img.into(),
                    reference_type: ReferenceType::Asset,
                })
                .chain(params.style_image.iter().map(|img| ReferenceImage {
                    image: img.into(),
                    reference_type: ReferenceType::Style,
                }))
                .collect();
        },
        GenerationMode::ExtendVideo => {
            let handle = params
                .input_video
                .as_ref()
                .ok_or_else(|| Error::invalid_request(EXTEND_REQUIRES_VIDEO))?;
            instance.video = Some(VideoRef {
                uri: handle.uri.clone(),
            });
            aspect_ratio = None;
        },
    }

    Ok(VideoPayload {
        instances: vec![instance],
        parameters: VideoParameters {
            sample_count: 1,
            aspect_ratio,
            resolution: params.resolution.as_str().to_owned(),
        },
    })
}

#[must_use]
pub fn build_image_payload(params: &GenerateImageParams) -> ImagePayload {
    ImagePayload {
        instances: vec![ImageInstance {
            prompt: params.prompt.trim().to_owned(),
        }],
        parameters: ImageParameters {
            sample_count: 1,
            aspect_ratio: params.aspect_ratio.as_str().to_owned(),
            output_mime_type: params.output_mime_type.clone(),
        },
    }
}
