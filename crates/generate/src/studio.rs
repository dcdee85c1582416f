//! End-to-end image and video requests.

use {
    framecast_common::{MediaKind, mime::kind_of},
    tracing::{debug, info},
};

use crate::{
    error::{Error, Result},
    payload::{build_image_payload, build_video_payload},
    poll::{PollConfig, wait_for_operation},
    provider::MediaProvider,
    types::{
        GenerateImageParams, GenerateVideoParams, IMAGEN_MODEL, ImageOutput, VideoHandle,
        VideoOutput,
    },
};

const FALLBACK_VIDEO_MIME: &str = "video/mp4";

/// Progress of a video request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioEvent {
    /// The job was accepted; `operation` is its resource name.
    Submitted { operation: String },
    /// About to re-fetch the job status.
    Polling { attempt: u32 },
    Downloading { uri: String },
    Finished,
}

/// Runs generation requests against a [`MediaProvider`].
#[derive(Debug)]
pub struct Studio<P> {
    provider: P,
    poll: PollConfig,
}

impl<P: MediaProvider> Studio<P> {
    pub fn new(provider: P, poll: PollConfig) -> Self {
        Self { provider, poll }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.provider.is_configured() {
            Ok(())
        } else {
            Err(Error::NotConfigured {
                provider: self.provider.name(),
            })
        }
    }

    /// Generate one still image.
    pub async fn generate_image(&self, params: &GenerateImageParams) -> Result<ImageOutput> {
        params.validate()?;
        self.ensure_configured()?;

        let model = match params.model.trim() {
            "" => IMAGEN_MODEL,
            m => m,
        };
        let payload = build_image_payload(params);
        info!(provider = self.provider.id(), model, aspect_ratio = %params.aspect_ratio, "generating image");

        let output = self.provider.generate_image(model, &payload).await?;
        debug!(bytes = output.data.len(), mime = %output.mime_type, "image generated");
        Ok(output)
    }

    pub async fn generate_video(&self, params: GenerateVideoParams) -> Result<VideoOutput> {
        self.generate_video_with_progress(params, |_| {}).await
    }

    /// Submit a video job, wait for it, and download the first sample.
    pub async fn generate_video_with_progress(
        &self,
        mut params: GenerateVideoParams,
        mut on_event: impl FnMut(StudioEvent) + Send,
    ) -> Result<VideoOutput> {
        params.apply_mode_constraints();
        params.validate()?;
        self.ensure_configured()?;

        let payload = build_video_payload(&params)?;
        info!(
            provider = self.provider.id(),
            model = %params.model,
            mode = %params.mode,
            aspect_ratio = %params.aspect_ratio,
            resolution = %params.resolution,
            "generating video"
        );

        let operation = self.provider.start_video(&params.model, &payload).await?;
        on_event(StudioEvent::Submitted {
            operation: operation.name.clone(),
        });

        let operation = wait_for_operation(&self.provider, operation, &self.poll, |attempt| {
            on_event(StudioEvent::Polling { attempt })
        })
        .await?;

        let Some(response) = operation.response else {
            return Err(Error::NoVideo {
                reason: Some("operation returned no response".into()),
            });
        };
        let generated = response.generate_video_response;
        let Some(sample) = generated.generated_samples.into_iter().next() else {
            let reasons = generated.rai_media_filtered_reasons;
            return Err(Error::NoVideo {
                reason: (!reasons.is_empty()).then(|| reasons.join("; ")),
            });
        };

        let video = sample.video.unwrap_or_default();
        let Some(uri) = video.uri.filter(|u| !u.is_empty()) else {
            return Err(Error::MissingVideoUri);
        };

        on_event(StudioEvent::Downloading { uri: uri.clone() });
        let downloaded = self.provider.download(&uri).await?;
        let mime_type = downloaded
            .mime_type
            .filter(|m| kind_of(m) == Some(MediaKind::Video))
            .or(video.mime_type)
            .unwrap_or_else(|| FALLBACK_VIDEO_MIME.into());

        info!(operation = %operation.name, bytes = downloaded.data.len(), mime = %mime_type, "video ready");
        on_event(StudioEvent::Finished);

        Ok(VideoOutput {
            data: downloaded.data,
            handle: VideoHandle {
                uri,
                mime_type: Some(mime_type.clone()),
            },
            mime_type,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            provider::{
                GeminiProvider, GenerateVideoResponse, GeneratedSample, GeneratedVideo, Operation,
                OperationResponse,
            },
            testing::ScriptedProvider,
            types::{AspectRatio, GenerationMode, ImageFile, Resolution, VEO_MODEL},
        },
        secrecy::Secret,
        std::time::Duration,
        wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{method, path},
        },
    };

    const URI: &str = "https://example.com/files/v1:download?alt=media";

    fn started() -> Operation {
        Operation {
            name: "models/veo/operations/op1".into(),
            ..Default::default()
        }
    }

    fn done_with(samples: Vec<GeneratedSample>) -> Operation {
        Operation {
            name: "models/veo/operations/op1".into(),
            done: true,
            response: Some(OperationResponse {
                generate_video_response: GenerateVideoResponse {
                    generated_samples: samples,
                    ..Default::default()
                },
            }),
            ..Default::default()
        }
    }

    fn sample(uri: Option<&str>) -> GeneratedSample {
        GeneratedSample {
            video: Some(GeneratedVideo {
                uri: uri.map(str::to_owned),
                mime_type: None,
            }),
        }
    }

    fn text_params() -> GenerateVideoParams {
        GenerateVideoParams {
            prompt: "a heron taking off".into(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn video_flow_reports_progress_and_downloads() {
        let provider = ScriptedProvider::new(vec![started(), done_with(vec![sample(Some(URI))])])
            .starting_with(started())
            .download_mime("video/mp4");
        let studio = Studio::new(provider, PollConfig::default());

        let mut events = Vec::new();
        let out = studio
            .generate_video_with_progress(text_params(), |e| events.push(e))
            .await
            .unwrap();

        assert_eq!(out.data.as_ref(), b"video-bytes");
        assert_eq!(out.mime_type, "video/mp4");
        assert_eq!(out.handle.uri, URI);
        assert_eq!(events, [
            StudioEvent::Submitted {
                operation: "models/veo/operations/op1".into()
            },
            StudioEvent::Polling { attempt: 1 },
            StudioEvent::Polling { attempt: 2 },
            StudioEvent::Downloading { uri: URI.into() },
            StudioEvent::Finished,
        ]);
        assert_eq!(studio.provider().downloaded(), [URI]);
    }

    #[tokio::test(start_paused = true)]
    async fn references_request_is_coerced_before_submit() {
        let provider = ScriptedProvider::new(vec![])
            .starting_with(done_with(vec![sample(Some(URI))]));
        let studio = Studio::new(provider, PollConfig::default());

        let params = GenerateVideoParams {
            mode: GenerationMode::ReferencesToVideo,
            prompt: "the same robot in a forest".into(),
            aspect_ratio: AspectRatio::Portrait,
            resolution: Resolution::P1080,
            reference_images: vec![ImageFile::new(&b"ref"[..], "image/png")],
            ..Default::default()
        };
        let out = studio.generate_video(params).await.unwrap();
        assert_eq!(out.mime_type, "video/mp4");

        let submitted = studio.provider().submitted();
        let (model, payload) = &submitted[0];
        assert_eq!(model, VEO_MODEL);
        assert_eq!(payload.parameters.resolution, "720p");
        assert_eq!(payload.parameters.aspect_ratio.as_deref(), Some("16:9"));
    }

    #[tokio::test(start_paused = true)]
    async fn non_video_content_type_falls_back_to_mp4() {
        let provider = ScriptedProvider::new(vec![])
            .starting_with(done_with(vec![sample(Some(URI))]))
            .download_mime("application/octet-stream");
        let studio = Studio::new(provider, PollConfig::default());

        let out = studio.generate_video(text_params()).await.unwrap();
        assert_eq!(out.mime_type, "video/mp4");
        assert_eq!(out.handle.mime_type.as_deref(), Some("video/mp4"));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_request_is_not_submitted() {
        let provider = ScriptedProvider::new(vec![]).starting_with(started());
        let studio = Studio::new(provider, PollConfig::default());

        let params = GenerateVideoParams {
            mode: GenerationMode::FramesToVideo,
            ..Default::default()
        };
        let err = studio.generate_video(params).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
        assert!(studio.provider().submitted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_response_is_no_video() {
        let done = Operation {
            done: true,
            ..started()
        };
        let studio = Studio::new(
            ScriptedProvider::new(vec![]).starting_with(done),
            PollConfig::default(),
        );
        let err = studio.generate_video(text_params()).await.unwrap_err();
        assert!(matches!(err, Error::NoVideo { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn filtered_samples_surface_reasons() {
        let mut done = done_with(vec![]);
        if let Some(response) = done.response.as_mut() {
            response.generate_video_response.rai_media_filtered_reasons =
                vec!["The prompt could not be processed.".into()];
        }
        let studio = Studio::new(
            ScriptedProvider::new(vec![]).starting_with(done),
            PollConfig::default(),
        );
        let err = studio.generate_video(text_params()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No videos were generated: The prompt could not be processed."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sample_without_uri_is_an_error() {
        let studio = Studio::new(
            ScriptedProvider::new(vec![]).starting_with(done_with(vec![sample(None)])),
            PollConfig::default(),
        );
        let err = studio.generate_video(text_params()).await.unwrap_err();
        assert!(matches!(err, Error::MissingVideoUri));
        assert!(studio.provider().downloaded().is_empty());
    }

    #[tokio::test]
    async fn image_request_uses_default_model_and_validates_prompt() {
        let studio = Studio::new(ScriptedProvider::new(vec![]), PollConfig::default());

        let err = studio
            .generate_image(&GenerateImageParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));

        let out = studio
            .generate_image(&GenerateImageParams {
                prompt: "a red kite".into(),
                model: String::new(),
                output_mime_type: "image/png".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(out.data.as_ref(), b"a red kite");
        assert_eq!(out.mime_type, "image/png");
    }

    #[tokio::test]
    async fn unconfigured_provider_is_rejected() {
        let studio = Studio::new(GeminiProvider::new(None), PollConfig::default());
        let err = studio.generate_video(text_params()).await.unwrap_err();
        assert_eq!(err.to_string(), "Google Gemini API key not configured");
    }

    #[tokio::test]
    async fn gemini_end_to_end() {
        let server = MockServer::start().await;
        let op_name = "models/veo-3.1-fast-generate-preview/operations/e2e";
        let video_uri = format!("{}/files/e2e:download?alt=media", server.uri());

        Mock::given(method("POST"))
            .and(path("/models/veo-3.1-fast-generate-preview:predictLongRunning"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": op_name
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{op_name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": op_name
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/{op_name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": op_name,
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [{ "video": { "uri": video_uri } }]
                    }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/e2e:download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(b"\x00\x00\x00\x18ftypmp42".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            GeminiProvider::new(Some(Secret::new("test-key".into()))).with_base_url(&server.uri());
        let studio = Studio::new(provider, PollConfig {
            interval: Duration::from_millis(10),
            timeout: Some(Duration::from_secs(10)),
        });

        let out = studio.generate_video(text_params()).await.unwrap();
        assert_eq!(out.handle.uri, video_uri);
        assert_eq!(out.handle.mime_type.as_deref(), Some("video/mp4"));
        assert!(out.data.ends_with(b"ftypmp42"));
    }
}
