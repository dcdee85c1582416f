//! Config schema types (api credentials, model defaults, polling, output).

use std::{path::PathBuf, time::Duration};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted, in order, when no API key is configured.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FramecastConfig {
    pub api: ApiConfig,
    pub image: ImageConfig,
    pub video: VideoConfig,
    pub polling: PollingConfig,
    pub output: OutputConfig,
}

/// Remote API credentials and endpoint.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret",
        deserialize_with = "deserialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,

    /// Base URL including the API version segment.
    pub base_url: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl ApiConfig {
    /// Configured key, or the first non-empty key found in [`API_KEY_ENV_VARS`].
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<Secret<String>> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Secret<String>> {
        if let Some(key) = self
            .api_key
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
        {
            return Some(key.clone());
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|v| !v.trim().is_empty())
            .map(Secret::new)
    }
}

/// Still-image generation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub model: String,
    pub output_mime_type: String,
    pub aspect_ratio: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: "imagen-4.0-generate-001".into(),
            output_mime_type: "image/jpeg".into(),
            aspect_ratio: "16:9".into(),
        }
    }
}

/// Video generation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub model: String,
    pub aspect_ratio: String,
    pub resolution: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            model: "veo-3.1-fast-generate-preview".into(),
            aspect_ratio: "16:9".into(),
            resolution: "720p".into(),
        }
    }
}

/// Long-running operation polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Fixed delay between status checks.
    pub interval_secs: u64,
    /// Give up after this many seconds. `0` waits indefinitely.
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            timeout_secs: 0,
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Where generated assets are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("framecast-output"),
        }
    }
}

fn serialize_option_secret<S>(
    value: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_option_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(Secret::new))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_studio_presets() {
        let cfg = FramecastConfig::default();
        assert_eq!(cfg.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.video.model, "veo-3.1-fast-generate-preview");
        assert_eq!(cfg.video.resolution, "720p");
        assert_eq!(cfg.image.output_mime_type, "image/jpeg");
        assert_eq!(cfg.polling.interval(), Duration::from_secs(10));
        assert!(cfg.polling.timeout().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: FramecastConfig = toml::from_str(
            r#"
            [video]
            resolution = "1080p"

            [polling]
            timeout_secs = 600
            "#,
        )
        .unwrap();
        assert_eq!(cfg.video.resolution, "1080p");
        assert_eq!(cfg.video.aspect_ratio, "16:9");
        assert_eq!(cfg.polling.interval_secs, 10);
        assert_eq!(cfg.polling.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let api = ApiConfig {
            api_key: Some(Secret::new("very-secret".into())),
            ..Default::default()
        };
        let out = format!("{api:?}");
        assert!(out.contains("[REDACTED]"));
        assert!(!out.contains("very-secret"));
    }

    #[test]
    fn configured_key_wins_over_env() {
        let api = ApiConfig {
            api_key: Some(Secret::new("from-config".into())),
            ..Default::default()
        };
        let key = api
            .resolve_api_key_with(|_| Some("from-env".into()))
            .unwrap();
        assert_eq!(key.expose_secret(), "from-config");
    }

    #[test]
    fn env_fallback_skips_blank_values() {
        let api = ApiConfig {
            api_key: Some(Secret::new("  ".into())),
            ..Default::default()
        };
        let key = api
            .resolve_api_key_with(|name| match name {
                "GEMINI_API_KEY" => Some(String::new()),
                "API_KEY" => Some("legacy".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(key.expose_secret(), "legacy");
        assert!(ApiConfig::default().resolve_api_key_with(|_| None).is_none());
    }

    #[test]
    fn api_key_round_trips_through_toml() {
        let cfg: FramecastConfig = toml::from_str("[api]\napi_key = \"abc\"\n").unwrap();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("api_key = \"abc\""));
    }
}
