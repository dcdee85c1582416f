//! Configuration validation.
//!
//! Detects unknown or misspelled fields, values the remote API will reject,
//! and setups that cannot authenticate.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use {secrecy::ExposeSecret, serde::Deserialize};

use crate::{env_subst::substitute_env, schema::FramecastConfig};

/// Aspect ratios the video endpoint accepts.
pub const VIDEO_ASPECT_RATIOS: &[&str] = &["16:9", "9:16"];

/// Aspect ratios the image endpoint accepts.
pub const IMAGE_ASPECT_RATIOS: &[&str] = &["1:1", "3:4", "4:3", "9:16", "16:9"];

/// Video resolutions.
pub const RESOLUTIONS: &[&str] = &["720p", "1080p"];

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "value", "auth", "security"
    pub category: &'static str,
    /// Dotted path, e.g. "video.resolution"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Known keys per section, mirroring `schema.rs`.
fn known_fields() -> HashMap<&'static str, &'static [&'static str]> {
    HashMap::from([
        ("api", &["api_key", "base_url"][..]),
        ("image", &["model", "output_mime_type", "aspect_ratio"][..]),
        ("video", &["model", "aspect_ratio", "resolution"][..]),
        ("polling", &["interval_secs", "timeout_secs"][..]),
        ("output", &["dir"][..]),
    ])
}

// ── Levenshtein distance ────────────────────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

fn unknown_message(key: &str, candidates: &[&str]) -> String {
    match suggest(key, candidates, 3) {
        Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
        None => "unknown field".into(),
    }
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or the discovered one if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file);

    let Some(ref actual_path) = config_path else {
        let mut result = validate_config(&FramecastConfig::default());
        result.diagnostics.insert(
            0,
            Diagnostic::new(
                Severity::Info,
                "syntax",
                "",
                "no config file found; using defaults",
            ),
        );
        return result;
    };

    let is_toml = actual_path
        .extension()
        .and_then(|e| e.to_str())
        .is_none_or(|e| e == "toml");

    let mut result = match std::fs::read_to_string(actual_path) {
        Ok(content) if is_toml => validate_toml_str(&substitute_env(&content)),
        Ok(_) => match crate::loader::load_config(actual_path) {
            Ok(cfg) => validate_config(&cfg),
            Err(e) => ValidationResult {
                diagnostics: vec![Diagnostic::new(
                    Severity::Error,
                    "syntax",
                    "",
                    format!("failed to parse config file: {e}"),
                )],
                config_path: None,
            },
        },
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to read config file: {e}"),
            )],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path.clone());
    result
}

/// Validate a TOML string without file-system side effects.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let toml_value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("TOML syntax error: {e}"),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    if let Some(table) = toml_value.as_table() {
        check_unknown_fields(table, &mut diagnostics);
    }

    match FramecastConfig::deserialize(toml_value) {
        Ok(config) => check_values(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Semantic checks on an already-parsed config.
#[must_use]
pub fn validate_config(config: &FramecastConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();
    check_values(config, &mut diagnostics);
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    table: &toml::map::Map<String, toml::Value>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let sections = known_fields();
    let section_names: Vec<&str> = sections.keys().copied().collect();

    for (section, value) in table {
        let Some(fields) = sections.get(section.as_str()) else {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "unknown-field",
                section.clone(),
                unknown_message(section, &section_names),
            ));
            continue;
        };
        let Some(inner) = value.as_table() else {
            continue;
        };
        for key in inner.keys() {
            if !fields.contains(&key.as_str()) {
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-field",
                    format!("{section}.{key}"),
                    unknown_message(key, fields),
                ));
            }
        }
    }
}

fn check_values(config: &FramecastConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.polling.interval_secs == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            "polling.interval_secs",
            "poll interval must be at least 1 second",
        ));
    }

    one_of(
        diagnostics,
        "video.aspect_ratio",
        &config.video.aspect_ratio,
        VIDEO_ASPECT_RATIOS,
    );
    one_of(
        diagnostics,
        "video.resolution",
        &config.video.resolution,
        RESOLUTIONS,
    );
    one_of(
        diagnostics,
        "image.aspect_ratio",
        &config.image.aspect_ratio,
        IMAGE_ASPECT_RATIOS,
    );
    one_of(
        diagnostics,
        "image.output_mime_type",
        &config.image.output_mime_type,
        &["image/jpeg", "image/png"],
    );

    let has_env_key = crate::schema::API_KEY_ENV_VARS
        .iter()
        .any(|name| std::env::var(name).is_ok_and(|v| !v.trim().is_empty()));
    let has_config_key = config
        .api
        .api_key
        .as_ref()
        .is_some_and(|k| !k.expose_secret().trim().is_empty());
    if !has_config_key && !has_env_key {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "auth",
            "api.api_key",
            "no API key configured and GEMINI_API_KEY is not set",
        ));
    } else if !has_config_key {
        diagnostics.push(Diagnostic::new(
            Severity::Info,
            "auth",
            "api.api_key",
            "using API key from the environment",
        ));
    }

    if !config.api.base_url.starts_with("https://") {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "security",
            "api.base_url",
            "base URL is not https; the API key will be sent in clear text",
        ));
    }
}

fn one_of(diagnostics: &mut Vec<Diagnostic>, path: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value) {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            path,
            format!("\"{value}\" is not one of {}", allowed.join(", ")),
        ));
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn paths(result: &ValidationResult, severity: Severity) -> Vec<String> {
        result
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.path.clone())
            .collect()
    }

    #[test]
    fn empty_config_has_no_errors() {
        let result = validate_toml_str("");
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
    }

    #[test]
    fn syntax_error_short_circuits() {
        let result = validate_toml_str("[video\nmodel = ");
        assert_eq!(result.count(Severity::Error), 1);
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn misspelled_field_gets_suggestion() {
        let result = validate_toml_str("[video]\nresolutoin = \"720p\"\n");
        let d = result
            .diagnostics
            .iter()
            .find(|d| d.category == "unknown-field")
            .unwrap();
        assert_eq!(d.path, "video.resolutoin");
        assert!(d.message.contains("\"resolution\""));
    }

    #[test]
    fn unknown_section_is_reported() {
        let result = validate_toml_str("[pollng]\ninterval_secs = 5\n");
        let d = &result.diagnostics[0];
        assert_eq!(d.path, "pollng");
        assert!(d.message.contains("\"polling\""));
    }

    #[test]
    fn rejects_bad_values() {
        let result = validate_toml_str(
            "[video]\naspect_ratio = \"4:3\"\nresolution = \"4k\"\n[polling]\ninterval_secs = 0\n",
        );
        let errors = paths(&result, Severity::Error);
        assert!(errors.contains(&"video.aspect_ratio".to_string()));
        assert!(errors.contains(&"video.resolution".to_string()));
        assert!(errors.contains(&"polling.interval_secs".to_string()));
    }

    #[test]
    fn image_accepts_square() {
        let result = validate_toml_str("[image]\naspect_ratio = \"1:1\"\n");
        assert!(!paths(&result, Severity::Error).contains(&"image.aspect_ratio".to_string()));
    }

    #[test]
    fn type_errors_are_reported() {
        let result = validate_toml_str("[polling]\ninterval_secs = \"ten\"\n");
        assert!(result.diagnostics.iter().any(|d| d.category == "type-error"));
    }

    #[test]
    fn plain_http_base_url_warns() {
        let result = validate_toml_str("[api]\nbase_url = \"http://localhost:9000/v1beta\"\n");
        assert!(paths(&result, Severity::Warning).contains(&"api.base_url".to_string()));
    }

    #[test]
    fn suggest_prefers_closest() {
        assert_eq!(
            suggest("modle", &["model", "dir"], 3),
            Some("model")
        );
        assert_eq!(suggest("zzzzzzzz", &["model"], 3), None);
    }

    #[test]
    fn validates_yaml_file_by_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("framecast.yaml");
        std::fs::write(&path, "video:\n  resolution: 480p\n").unwrap();
        let result = validate(Some(&path));
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
        assert!(paths(&result, Severity::Error).contains(&"video.resolution".to_string()));
    }
}
