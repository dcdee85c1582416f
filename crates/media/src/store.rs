//! On-disk asset store for generated media.
//!
//! Files are named `{stem}---{uuid}.{ext}` so repeated runs with the same
//! prompt never overwrite each other. Metadata for an asset lives next to it
//! as `{file}.json`.

use std::path::{Path, PathBuf};

use {
    serde::{Serialize, de::DeserializeOwned},
    tracing::debug,
};

use crate::error::{Context, Error, Result};

/// Longest stem kept from a prompt-derived name.
const MAX_STEM_CHARS: usize = 48;

/// Write `data` into `dir` and return the full path.
///
/// `stem` is slugified; an empty slug becomes `asset`. The extension comes
/// from `mime_type` and falls back to `bin`.
pub async fn save_asset(dir: &Path, stem: &str, data: &[u8], mime_type: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let ext = framecast_common::mime::extension_for(mime_type).unwrap_or("bin");
    let path = dir.join(format!("{}---{}.{ext}", slugify(stem), uuid::Uuid::new_v4()));

    tokio::fs::write(&path, data)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = data.len(), mime = mime_type, "saved asset");
    Ok(path)
}

/// Path of the JSON sidecar for `asset`.
#[must_use]
pub fn sidecar_path(asset: &Path) -> PathBuf {
    let mut name = asset.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Write `value` as pretty JSON next to `asset`.
pub async fn save_sidecar<T: Serialize>(asset: &Path, value: &T) -> Result<PathBuf> {
    let path = sidecar_path(asset);
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Read a sidecar. `path` may point at the sidecar itself or at its asset.
pub async fn load_sidecar<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let path = if path.extension().is_some_and(|e| e == "json") {
        path.to_path_buf()
    } else {
        sidecar_path(path)
    };
    let raw = tokio::fs::read(&path).await.map_err(|e| {
        Error::external(format!("failed to read sidecar {}", path.display()), e)
    })?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Lowercase ASCII slug: alphanumerics kept, runs of anything else become `-`.
fn slugify(stem: &str) -> String {
    let mut slug = String::with_capacity(stem.len().min(MAX_STEM_CHARS));
    for ch in stem.chars() {
        if slug.len() >= MAX_STEM_CHARS {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "asset".into()
    } else {
        slug.into()
    }
}
