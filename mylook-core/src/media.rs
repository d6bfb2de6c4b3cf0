//! Item photo handling
//!
//! Inline images travel as data URLs (`data:<mime>;base64,<payload>`).
//! Before upload the photo is resized so its longer side is at most 1200
//! pixels and re-encoded as JPEG; decode failures fall back to the
//! original bytes rather than blocking the upload.

use crate::error::{EngineError, EngineResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::imageops::FilterType;
use tracing::warn;

/// Longest image side kept on upload
pub const MAX_UPLOAD_SIDE: u32 = 1200;

/// JPEG quality used for re-encoded uploads
pub const UPLOAD_JPEG_QUALITY: u8 = 82;

/// A decoded inline image
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl InlineImage {
    /// File extension matching the mime type (jpg unless png/webp)
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

/// Parse a `data:<mime>;base64,<payload>` URL into bytes and mime type
pub fn decode_data_url(data_url: &str) -> EngineResult<InlineImage> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| EngineError::Parse("Not a data URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| EngineError::Parse("Data URL has no payload".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| EngineError::Parse("Data URL is not base64-encoded".to_string()))?;
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| EngineError::Parse(format!("Data URL payload: {}", e)))?;
    Ok(InlineImage {
        bytes,
        mime: if mime.is_empty() {
            "image/jpeg".to_string()
        } else {
            mime.to_string()
        },
    })
}

/// Build a data URL from raw image bytes
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Shrink an image for upload: longest side clamped to `max_side`,
/// re-encoded as JPEG. Never upscales. On decode failure the original
/// bytes pass through unchanged.
pub fn resize_for_upload(image: InlineImage, max_side: u32) -> InlineImage {
    let decoded = match image::load_from_memory(&image.bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "Image decode failed, uploading original bytes");
            return image;
        }
    };

    let (width, height) = (decoded.width(), decoded.height());
    let longest = width.max(height);
    let resized = if longest > max_side {
        decoded.resize(max_side, max_side, FilterType::Triangle)
    } else {
        decoded
    };

    let mut out = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, UPLOAD_JPEG_QUALITY);
    match encoder.encode_image(&resized.to_rgb8()) {
        Ok(()) => InlineImage {
            bytes: out,
            mime: "image/jpeg".to_string(),
        },
        Err(e) => {
            warn!(error = %e, "JPEG encode failed, uploading original bytes");
            image
        }
    }
}
