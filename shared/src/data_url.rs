use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::MaskError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDataUrl<'a> {
    /// Media subtype as written, e.g. `png`, `jpeg`, `svg+xml`.
    pub subtype: &'a str,
    pub payload: &'a str,
}

impl ImageDataUrl<'_> {
    /// File extension used when the payload is written to disk.
    pub fn file_extension(&self) -> String {
        let subtype = self.subtype.to_ascii_lowercase();
        match subtype.as_str() {
            "jpeg" => "jpg".to_string(),
            "svg+xml" => "svg".to_string(),
            "x-icon" | "vnd.microsoft.icon" => "ico".to_string(),
            _ => subtype,
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, MaskError> {
        STANDARD
            .decode(self.payload)
            .map_err(|e| MaskError::InvalidMaskEncoding(format!("bad base64 payload: {e}")))
    }
}

/// Strict `data:image/<ext>;base64,<payload>` parser; anything else is rejected whole.
pub fn parse_image_data_url(input: &str) -> Result<ImageDataUrl<'_>, MaskError> {
    let rest = input
        .strip_prefix("data:image/")
        .ok_or_else(|| MaskError::InvalidMaskEncoding("expected a data:image/ URL".into()))?;
    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| MaskError::InvalidMaskEncoding("expected ;base64, marker".into()))?;
    if subtype.is_empty()
        || !subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return Err(MaskError::InvalidMaskEncoding(format!(
            "invalid image subtype {subtype:?}"
        )));
    }
    if payload.is_empty() || !payload.chars().all(is_base64_char) {
        return Err(MaskError::InvalidMaskEncoding(
            "payload is not base64".into(),
        ));
    }
    Ok(ImageDataUrl { subtype, payload })
}

/// Decodes raw base64 or a `data:...;base64,` URL.
pub fn decode_base64_payload(input: &str) -> Result<Vec<u8>, MaskError> {
    let trimmed = input.trim();
    let payload = if trimmed.starts_with("data:") {
        let (header, payload) = trimmed
            .split_once(',')
            .ok_or_else(|| MaskError::InvalidMaskEncoding("data URL without payload".into()))?;
        if !header.ends_with(";base64") {
            return Err(MaskError::InvalidMaskEncoding(
                "data URL is not base64 encoded".into(),
            ));
        }
        payload
    } else {
        trimmed
    };
    STANDARD
        .decode(payload)
        .map_err(|e| MaskError::InvalidMaskEncoding(format!("bad base64 payload: {e}")))
}

pub fn to_png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", encode_base64(bytes))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}
