//! Per-mode request rules.
//!
//! `validate` is the submit gate: it names the first missing input.
//! `apply_mode_constraints` runs before it and coerces settings the API
//! would reject for the selected mode.

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    types::{
        AspectRatio, GenerateImageParams, GenerateVideoParams, GenerationMode,
        MAX_REFERENCE_IMAGES, Resolution, VEO_FAST_MODEL, VEO_MODEL,
    },
};

pub const EXTEND_REQUIRES_VIDEO: &str = "An input video object is required to extend a video.";

impl GenerateVideoParams {
    /// Check that the inputs required by `mode` are present.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            GenerationMode::TextToVideo => {
                if self.prompt_text().is_none() {
                    return Err(Error::invalid_request("A prompt is required for text-to-video."));
                }
            },
            GenerationMode::FramesToVideo => {
                if self.start_frame.is_none() {
                    return Err(Error::invalid_request(
                        "A start frame is required for frames-to-video.",
                    ));
                }
            },
            GenerationMode::ReferencesToVideo => {
                if self.prompt_text().is_none() {
                    return Err(Error::invalid_request(
                        "A prompt is required for references-to-video.",
                    ));
                }
                if self.reference_images.is_empty() {
                    return Err(Error::invalid_request(
                        "At least one reference image is required for references-to-video.",
                    ));
                }
                if self.reference_images.len() > MAX_REFERENCE_IMAGES {
                    return Err(Error::invalid_request(format!(
                        "At most {MAX_REFERENCE_IMAGES} reference images are allowed, got {}.",
                        self.reference_images.len()
                    )));
                }
            },
            GenerationMode::ExtendVideo => {
                if self.input_video.is_none() {
                    return Err(Error::invalid_request(EXTEND_REQUIRES_VIDEO));
                }
            },
        }
        if !self.aspect_ratio.supports_video() {
            return Err(Error::invalid_request(format!(
                "Aspect ratio {} is not supported for video.",
                self.aspect_ratio
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Coerce settings to what the selected mode supports and drop inputs the
    /// mode does not use.
    pub fn apply_mode_constraints(&mut self) {
        let mode = self.mode;

        if self.model.trim().is_empty() {
            self.model = VEO_FAST_MODEL.into();
        }

        match mode {
            GenerationMode::ReferencesToVideo => {
                if self.model != VEO_MODEL {
                    warn!(%mode, from = %self.model, to = VEO_MODEL, "overriding model");
                    self.model = VEO_MODEL.into();
                }
                self.force_resolution(Resolution::P720);
                if self.aspect_ratio != AspectRatio::Landscape {
                    warn!(%mode, from = %self.aspect_ratio, to = %AspectRatio::Landscape, "overriding aspect ratio");
                    self.aspect_ratio = AspectRatio::Landscape;
                }
            },
            GenerationMode::ExtendVideo => self.force_resolution(Resolution::P720),
            GenerationMode::TextToVideo | GenerationMode::FramesToVideo => {},
        }

        let uses_frames = mode == GenerationMode::FramesToVideo;
        let uses_references = mode == GenerationMode::ReferencesToVideo;
        let uses_video = mode == GenerationMode::ExtendVideo;

        if !uses_frames && (self.start_frame.is_some() || self.end_frame.is_some()) {
            debug!(%mode, "dropping start/end frames");
            self.start_frame = None;
            self.end_frame = None;
        }
        if !uses_frames && self.is_looping {
            self.is_looping = false;
        }
        if !uses_references && (!self.reference_images.is_empty() || self.style_image.is_some()) {
            debug!(%mode, "dropping reference and style images");
            self.reference_images.clear();
            self.style_image = None;
        }
        if !uses_video && self.input_video.take().is_some() {
            debug!(%mode, "dropping input video");
        }
    }

    fn force_resolution(&mut self, resolution: Resolution) {
        if self.resolution != resolution {
            warn!(mode = %self.mode, from = %self.resolution, to = %resolution, "overriding resolution");
            self.resolution = resolution;
        }
    }
}

impl GenerateImageParams {
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::invalid_request("A prompt is required to generate an image."));
        }
        Ok(())
    }
}
