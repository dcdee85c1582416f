//! MIME type table for the media framecast sends and receives.

use serde::{Deserialize, Serialize};

/// Broad category of a generated or uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// `(mime, extension, kind)`; the first row for a MIME type is its canonical extension.
const TABLE: &[(&str, &str, MediaKind)] = &[
    ("image/png", "png", MediaKind::Image),
    ("image/jpeg", "jpg", MediaKind::Image),
    ("image/jpeg", "jpeg", MediaKind::Image),
    ("image/webp", "webp", MediaKind::Image),
    ("video/mp4", "mp4", MediaKind::Video),
    ("video/webm", "webm", MediaKind::Video),
    ("video/quicktime", "mov", MediaKind::Video),
];

/// Strip parameters (`; codecs=...`) and normalise case.
fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// File extension for a MIME type, without the leading dot.
#[must_use]
pub fn extension_for(mime: &str) -> Option<&'static str> {
    let mime = essence(mime);
    TABLE.iter().find(|(m, ..)| *m == mime).map(|(_, ext, _)| *ext)
}

/// MIME type for a file extension (case-insensitive, leading dot allowed).
#[must_use]
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    TABLE.iter().find(|(_, e, _)| *e == ext).map(|(m, ..)| *m)
}

/// Media kind for a MIME type, falling back to the `image/` / `video/` prefix.
#[must_use]
pub fn kind_of(mime: &str) -> Option<MediaKind> {
    let mime = essence(mime);
    if let Some((.., kind)) = TABLE.iter().find(|(m, ..)| *m == mime) {
        return Some(*kind);
    }
    if mime.starts_with("image/") {
        Some(MediaKind::Image)
    } else if mime.starts_with("video/") {
        Some(MediaKind::Video)
    } else {
        None
    }
}
