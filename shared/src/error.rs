use std::fmt::{self, Display};

/// Every failure the mask pipeline can report. `code()` is what goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    NoImageLoaded,
    EmptyMask,
    InvalidMaskEncoding(String),
    DimensionMismatch(String),
    DecodeFailure(String),
    InvalidEncoding(String),
    StorageUnavailable(String),
}

impl MaskError {
    pub fn code(&self) -> &'static str {
        match self {
            MaskError::NoImageLoaded => "NoImageLoaded",
            MaskError::EmptyMask => "EmptyMask",
            MaskError::InvalidMaskEncoding(_) => "InvalidMaskEncoding",
            MaskError::DimensionMismatch(_) => "DimensionMismatch",
            MaskError::DecodeFailure(_) => "DecodeFailure",
            MaskError::InvalidEncoding(_) => "InvalidEncoding",
            MaskError::StorageUnavailable(_) => "StorageUnavailable",
        }
    }

    /// Inverse of [`MaskError::code`]; unknown codes become `DecodeFailure`.
    pub fn from_code(code: &str, message: &str) -> Self {
        let message = message.to_string();
        match code {
            "NoImageLoaded" => MaskError::NoImageLoaded,
            "EmptyMask" => MaskError::EmptyMask,
            "InvalidMaskEncoding" => MaskError::InvalidMaskEncoding(message),
            "DimensionMismatch" => MaskError::DimensionMismatch(message),
            "InvalidEncoding" => MaskError::InvalidEncoding(message),
            "StorageUnavailable" => MaskError::StorageUnavailable(message),
            _ => MaskError::DecodeFailure(message),
        }
    }
}

impl Display for MaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskError::NoImageLoaded => write!(f, "No image is loaded"),
            MaskError::EmptyMask => write!(f, "Nothing has been painted yet"),
            MaskError::InvalidMaskEncoding(s) => write!(f, "Invalid mask encoding: {s}"),
            MaskError::DimensionMismatch(s) => write!(f, "Image/mask mismatch: {s}"),
            MaskError::DecodeFailure(s) => write!(f, "Failed to decode image: {s}"),
            MaskError::InvalidEncoding(s) => write!(f, "Invalid result encoding: {s}"),
            MaskError::StorageUnavailable(s) => write!(f, "Storage unavailable: {s}"),
        }
    }
}

impl std::error::Error for MaskError {}
