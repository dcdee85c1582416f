//! Reference-image loading for generation requests.
//!
//! Start/end frames, reference assets, and style images are sent inline as
//! base64, so they are sniffed, re-encoded when the API would not accept the
//! container, and downscaled when they exceed the inline size budget.

use std::{io::Cursor, path::Path};

use {
    bytes::Bytes,
    image::{DynamicImage, GenericImageView, ImageFormat, ImageReader},
    tracing::{debug, info},
};

use crate::error::{Error, Result};

/// Largest edge sent to the API. Bigger inputs are downscaled.
pub const MAX_DIMENSION: u32 = 3840;

/// Inline payload budget for a single image.
pub const MAX_INLINE_BYTES: usize = 15 * 1024 * 1024;

/// An image ready to be attached to a request.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub data: Bytes,
    /// One of `image/png`, `image/jpeg`, `image/webp`.
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    /// Whether the bytes differ from the original input.
    pub was_converted: bool,
}

/// Read an image file and normalise it for upload.
pub async fn load_image(path: &Path) -> Result<LoadedImage> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| Error::external(format!("failed to read {}", path.display()), e))?;
    let hint = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(framecast_common::mime::from_extension)
        .and_then(ImageFormat::from_mime_type);
    let loaded = normalize(&raw, hint)?;
    debug!(
        path = %path.display(),
        mime = loaded.mime_type,
        width = loaded.width,
        height = loaded.height,
        converted = loaded.was_converted,
        "loaded reference image"
    );
    Ok(loaded)
}

/// Sniff `data`, keep it as-is when the API accepts it, otherwise re-encode.
///
/// Decodable formats outside PNG/JPEG/WebP become PNG. Images over
/// [`MAX_DIMENSION`] or [`MAX_INLINE_BYTES`] are downscaled and re-encoded,
/// JPEG as JPEG and everything else as PNG.
pub fn normalize_image(data: &[u8]) -> Result<LoadedImage> {
    normalize(data, None)
}

/// `hint` is used only when the content itself is not recognised.
fn normalize(data: &[u8], hint: Option<ImageFormat>) -> Result<LoadedImage> {
    let format = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| Error::external("failed to guess image format", e))?
        .format()
        .or(hint)
        .ok_or_else(|| Error::invalid_input("unrecognised image format"))?;

    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| Error::external("failed to decode image", e))?;
    let (width, height) = img.dimensions();

    let accepted = accepted_mime(format);
    let oversized = width > MAX_DIMENSION || height > MAX_DIMENSION || data.len() > MAX_INLINE_BYTES;

    if let (Some(mime_type), false) = (accepted, oversized) {
        return Ok(LoadedImage {
            data: Bytes::copy_from_slice(data),
            mime_type,
            width,
            height,
            was_converted: false,
        });
    }

    let img = if oversized {
        let resized = fit_within(&img, MAX_DIMENSION);
        info!(
            from = %format!("{width}x{height}"),
            to = %format!("{}x{}", resized.width(), resized.height()),
            "downscaling oversized reference image"
        );
        resized
    } else {
        img
    };

    let target = match format {
        ImageFormat::Jpeg => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    };
    let encoded = encode(&img, target)?;
    if encoded.len() > MAX_INLINE_BYTES {
        return Err(Error::invalid_input(format!(
            "image is {} bytes after re-encoding, limit is {MAX_INLINE_BYTES}",
            encoded.len()
        )));
    }

    let (width, height) = img.dimensions();
    Ok(LoadedImage {
        data: Bytes::from(encoded),
        mime_type: accepted_mime(target).unwrap_or("image/png"),
        width,
        height,
        was_converted: true,
    })
}

fn accepted_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Scale down so neither edge exceeds `max_dimension`, preserving aspect ratio.
fn fit_within(img: &DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return img.clone();
    }
    // `resize` already preserves aspect ratio inside the bounding box.
    img.resize(
        max_dimension,
        max_dimension,
        image::imageops::FilterType::Lanczos3,
    )
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut output = Cursor::new(Vec::new());
    let img = if format == ImageFormat::Jpeg {
        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img.clone()
    };
    img.write_to(&mut output, format)
        .map_err(|e| Error::external("failed to encode image", e))?;
    Ok(output.into_inner())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn sample(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 255) as u8, (y % 255) as u8, 128])
        }));
        encode(&img, format).unwrap()
    }

    #[test]
    fn png_passes_through_untouched() {
        let data = sample(4, 2, ImageFormat::Png);
        let loaded = normalize_image(&data).unwrap();
        assert_eq!(loaded.mime_type, "image/png");
        assert_eq!((loaded.width, loaded.height), (4, 2));
        assert!(!loaded.was_converted);
        assert_eq!(loaded.data.as_ref(), data.as_slice());
    }

    #[test]
    fn jpeg_is_detected_from_content() {
        let data = sample(3, 3, ImageFormat::Jpeg);
        let loaded = normalize_image(&data).unwrap();
        assert_eq!(loaded.mime_type, "image/jpeg");
    }

    #[test]
    fn oversized_image_is_downscaled() {
        let data = sample(MAX_DIMENSION + 160, 200, ImageFormat::Png);
        let loaded = normalize_image(&data).unwrap();
        assert!(loaded.was_converted);
        assert_eq!(loaded.width, MAX_DIMENSION);
        assert!(loaded.height < 200);
        assert_eq!(loaded.mime_type, "image/png");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = normalize_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn load_image_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("start.png");
        std::fs::write(&path, sample(8, 8, ImageFormat::Png)).unwrap();

        let loaded = load_image(&path).await.unwrap();
        assert_eq!(loaded.mime_type, "image/png");
        assert_eq!(loaded.width, 8);
    }

    #[tokio::test]
    async fn extension_hint_does_not_rescue_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let err = load_image(&path).await.unwrap_err();
        assert!(matches!(err, Error::External { .. }));
        assert!(err.to_string().contains("failed to decode image"));
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = load_image(Path::new("/nonexistent/frame.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/frame.png"));
    }
}
