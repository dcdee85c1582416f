use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::FramecastConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "framecast.toml",
    "framecast.yaml",
    "framecast.yml",
    "framecast.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<FramecastConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./framecast.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/framecast/framecast.{toml,yaml,yml,json}` (user-global)
///
/// Returns `FramecastConfig::default()` if no config file is found or the
/// file fails to parse.
pub fn discover_and_load() -> FramecastConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    FramecastConfig::default()
}

/// Load an explicitly named file, or fall back to discovery.
///
/// Unlike [`discover_and_load`], an explicit path that fails to load is an error.
pub fn load_or_discover(path: Option<&Path>) -> Result<FramecastConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(discover_and_load()),
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_config_file_in(Path::new("."), config_dir().as_deref())
}

fn find_config_file_in(local: &Path, global: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(local)
        .chain(global)
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/framecast/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "framecast").map(|d| d.config_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("framecast.toml")
}

/// Serialize `config` to TOML and write it to `path`.
///
/// Creates parent directories if needed.
pub fn save_config(config: &FramecastConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Write the documented default template to `path`.
///
/// Creates parent directories if needed.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, crate::template::default_config_template())?;
    debug!(path = %path.display(), "wrote default config");
    Ok(())
}

fn parse_config(raw: &str, path: &Path) -> Result<FramecastConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat { ext: ext.into() }),
    }
}
