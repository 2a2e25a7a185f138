use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{MemeError, Result};

pub const DEFAULT_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decodes the `image` field sent by the UI.
///
/// Accepts a full `data:<mime>;base64,<data>` URI or bare base64, in which case
/// `file_type` (or JPEG) names the MIME type.
pub fn decode_image_field(image: &str, file_type: Option<&str>) -> Result<DecodedImage> {
    let image = image.trim();
    if image.is_empty() {
        return Err(MemeError::MissingImage);
    }

    let (mime_type, data) = match image.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| MemeError::UnsupportedMedia("malformed data URI".into()))?;
            let mime = header.strip_suffix(";base64").ok_or_else(|| {
                MemeError::UnsupportedMedia("data URI is not base64 encoded".into())
            })?;
            (mime.to_string(), data)
        }
        None => (
            file_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_MIME)
                .to_string(),
            image,
        ),
    };

    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| MemeError::UnsupportedMedia(format!("invalid base64: {}", e)))?;

    Ok(DecodedImage { mime_type, bytes })
}
