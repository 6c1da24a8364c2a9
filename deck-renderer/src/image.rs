//! Image loading utilities.
//!
//! Resolves the sources an image insertion can come from (URLs, base64 data
//! URIs, raw file bytes) into a `src` string the scene can store plus the
//! image's natural size.

use base64::Engine as _;
use deck_core::ImageSource;

use crate::error::{RenderError, RenderResult};

/// Natural size assumed for remote images, which are referenced but never
/// fetched.
pub const REMOTE_IMAGE_SIZE: (u32, u32) = (400, 300);

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// GIF.
    Gif,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type for data URIs.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// An image source resolved for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Value for the image object's `src`.
    pub src: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Detected format.
    pub format: ImageFormat,
}

/// Decode image bytes far enough to learn their size.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image.
pub fn image_dimensions(data: &[u8]) -> RenderResult<(u32, u32)> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Image(format!("Failed to decode image: {e}")))?;
    Ok((img.width(), img.height()))
}

/// Split a data URI into its MIME type and decoded payload.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed.
pub fn parse_data_uri(uri: &str) -> RenderResult<(String, Vec<u8>)> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Image("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Image("Invalid data URI: missing comma".to_string()))?;

    let mime = metadata.split(';').next().unwrap_or_default().to_string();

    let bytes = if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data)
            .map_err(|e| RenderError::Image(format!("Failed to decode base64: {e}")))?
    } else {
        urlencoding_decode(encoded_data)?
    };

    Ok((mime, bytes))
}

/// Encode bytes as a base64 data URI.
#[must_use]
pub fn to_data_uri(data: &[u8], format: ImageFormat) -> String {
    format!(
        "data:{};base64,{}",
        format.mime(),
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}

/// Simple URL decoding (percent-encoding).
fn urlencoding_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Image("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Resolve an insertion source.
///
/// Bytes are sniffed, decoded for their size and embedded as a data URI.
/// Data URIs are decoded for their size and kept as they are. Remote URLs are
/// kept as references with [`REMOTE_IMAGE_SIZE`].
///
/// # Errors
///
/// Returns an error if bytes or a data URI do not decode as an image.
pub fn resolve(source: &ImageSource) -> RenderResult<ResolvedImage> {
    match source {
        ImageSource::Url(url) => {
            let (width, height) = REMOTE_IMAGE_SIZE;
            Ok(ResolvedImage {
                src: url.clone(),
                width,
                height,
                format: ImageFormat::Unknown,
            })
        }
        ImageSource::DataUri(uri) => {
            let (mime, bytes) = parse_data_uri(uri)?;
            let (width, height) = image_dimensions(&bytes)?;
            Ok(ResolvedImage {
                src: uri.clone(),
                width,
                height,
                format: ImageFormat::from_mime(&mime),
            })
        }
        ImageSource::Bytes(bytes) => {
            let format = ImageFormat::from_magic_bytes(bytes);
            let (width, height) = image_dimensions(bytes)?;
            tracing::debug!(?format, width, height, "Decoded uploaded image");
            Ok(ResolvedImage {
                src: to_data_uri(bytes, format),
                width,
                height,
                format,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal valid PNG (1x1 red pixel)
    const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    fn png_bytes() -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .decode(PNG_BASE64)
            .expect("valid base64")
    }

    #[test]
    fn test_format_detection_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_mime("IMAGE/JPEG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_mime("image/webp"), ImageFormat::WebP);
        assert_eq!(ImageFormat::from_mime("text/plain"), ImageFormat::Unknown);
    }

    #[test]
    fn test_format_detection_from_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&png_bytes()), ImageFormat::Png);
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[1, 2]), ImageFormat::Unknown);
    }

    #[test]
    fn test_data_uri_parsing() {
        let (mime, bytes) =
            parse_data_uri(&format!("data:image/png;base64,{PNG_BASE64}")).expect("parse");
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, png_bytes());

        let (_, plain) = parse_data_uri("data:text/plain,a%20b").expect("parse");
        assert_eq!(plain, b"a b");
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(parse_data_uri("not a data uri").is_err());
        assert!(parse_data_uri("data:image/png").is_err());
        assert!(parse_data_uri("data:text/plain,%zz").is_err());
    }

    #[test]
    fn test_resolve_bytes_embeds_data_uri() {
        let resolved = resolve(&ImageSource::Bytes(png_bytes())).expect("resolve");
        assert_eq!((resolved.width, resolved.height), (1, 1));
        assert_eq!(resolved.format, ImageFormat::Png);
        assert_eq!(resolved.src, format!("data:image/png;base64,{PNG_BASE64}"));
    }

    #[test]
    fn test_resolve_url_is_not_fetched() {
        let resolved =
            resolve(&ImageSource::Url("https://example.com/cat.png".to_string())).expect("resolve");
        assert_eq!((resolved.width, resolved.height), REMOTE_IMAGE_SIZE);
        assert_eq!(resolved.src, "https://example.com/cat.png");
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(resolve(&ImageSource::Bytes(vec![0, 1, 2, 3, 4])).is_err());
        assert!(resolve(&ImageSource::DataUri("data:image/png;base64,AAAA".to_string())).is_err());
    }
}
