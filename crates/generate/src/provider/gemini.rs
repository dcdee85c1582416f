//! Google Generative Language API (Imagen + Veo) provider.

use std::{fmt, time::Duration};

use {
    async_trait::async_trait,
    base64::Engine,
    bytes::Bytes,
    framecast_config::{ApiConfig, schema::DEFAULT_BASE_URL},
    reqwest::{Client, RequestBuilder, Response, header::CONTENT_TYPE},
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    payload::{ImagePayload, VideoPayload},
    provider::{DownloadedMedia, MediaProvider, Operation},
    types::ImageOutput,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Per-request limit for API calls. Downloads get [`DOWNLOAD_TIMEOUT`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub struct GeminiProvider {
    api_key: Option<Secret<String>>,
    base_url: String,
    client: Client,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: Option<Secret<String>>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            client: Client::new(),
            request_timeout: REQUEST_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
        }
    }

    /// Build from config, falling back to `GEMINI_API_KEY` / `API_KEY`.
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.resolve_api_key()).with_base_url(&config.base_url)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.base_url = trimmed.to_owned();
        }
        self
    }

    /// Override the per-request limits for API calls and downloads.
    #[must_use]
    pub fn with_timeouts(mut self, request: Duration, download: Duration) -> Self {
        self.request_timeout = request;
        self.download_timeout = download;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Result<&Secret<String>> {
        self.api_key
            .as_ref()
            .ok_or(Error::NotConfigured { provider: "Gemini" })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{model}:{method}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let key = self.api_key()?;
        let resp = request
            .timeout(self.request_timeout)
            .header(API_KEY_HEADER, key.expose_secret())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "gemini API error");
            return Err(Error::Api { status, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl MediaProvider for GeminiProvider {
    fn id(&self) -> &'static str {
        "gemini"
    }

    fn name(&self) -> &'static str {
        "Google Gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_image(&self, model: &str, payload: &ImagePayload) -> Result<ImageOutput> {
        let url = self.model_url(model, "predict");
        debug!(model, "gemini image request");

        let resp = self.send(self.client.post(&url).json(payload)).await?;
        let body: PredictResponse = resp.json().await?;

        let Some(prediction) = body.predictions.into_iter().next() else {
            return Err(Error::NoImage { reason: None });
        };
        let Some(encoded) = prediction.bytes_base64_encoded.filter(|b| !b.is_empty()) else {
            return Err(Error::NoImage {
                reason: prediction.rai_filtered_reason,
            });
        };

        let data = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        Ok(ImageOutput {
            data: Bytes::from(data),
            mime_type: prediction
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| payload.parameters.output_mime_type.clone()),
        })
    }

    async fn start_video(&self, model: &str, payload: &VideoPayload) -> Result<Operation> {
        let url = self.model_url(model, "predictLongRunning");
        debug!(model, "gemini video request");

        let resp = self.send(self.client.post(&url).json(payload)).await?;
        let operation: Operation = resp.json().await?;
        debug!(operation = %operation.name, "video operation started");
        Ok(operation)
    }

    async fn get_operation(&self, name: &str) -> Result<Operation> {
        let url = format!("{}/{}", self.base_url, name.trim_start_matches('/'));
        let resp = self.send(self.client.get(&url)).await?;
        Ok(resp.json().await?)
    }

    async fn download(&self, uri: &str) -> Result<DownloadedMedia> {
        let key = self.api_key()?;
        let url = urlencoding::decode(uri)
            .map_err(|e| Error::message(format!("invalid video URI: {e}")))?;

        let resp = self
            .client
            .get(url.as_ref())
            .timeout(self.download_timeout)
            .header(API_KEY_HEADER, key.expose_secret())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = %status, "video download failed");
            return Err(Error::Download { status });
        }

        let mime_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let data = resp.bytes().await?;
        debug!(bytes = data.len(), mime = ?mime_type, "downloaded video");
        Ok(DownloadedMedia { data, mime_type })
    }
}

// ── API response types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
    rai_filtered_reason: Option<String>,
}
