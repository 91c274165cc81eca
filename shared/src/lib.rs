use serde::{Deserialize, Serialize};

pub mod asset;
pub mod composite;
pub mod data_url;
pub mod display;
pub mod error;
pub mod mask;
pub mod rasterize;
pub mod remap;
pub mod stroke;

pub use asset::ImageAsset;
pub use display::DisplayRect;
pub use error::MaskError;
pub use mask::{NativeMask, PaintedMask};
pub use remap::{RemapJob, RemapResult};
pub use stroke::StrokeAccumulator;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&MaskError> for ErrorBody {
    fn from(error: &MaskError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMaskRequest {
    pub mask_data_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMaskResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ConfirmMaskResponse {
    pub fn failed(error: &MaskError) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CompositeRequest {
    pub image: String,
    pub mask: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CompositeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl CompositeResponse {
    pub fn ok(result: String) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: &MaskError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenToolRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenToolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl OpenToolResponse {
    pub fn failed(error: &MaskError) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfoResponse {
    pub success: bool,
    pub has_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saved_masks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_request_uses_camel_case_fields() {
        let request = ConfirmMaskRequest {
            mask_data_url: "data:image/png;base64,AAAA".to_string(),
            original_file_name: Some("photo.jpg".to_string()),
            session_id: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"maskDataUrl\""));
        assert!(json.contains("\"originalFileName\""));
        assert!(!json.contains("sessionId"));
    }

    #[test]
    fn confirm_request_accepts_missing_file_name() {
        let request: ConfirmMaskRequest =
            serde_json::from_str(r#"{"maskDataUrl":"data:image/png;base64,AAAA"}"#).unwrap();
        assert_eq!(request.original_file_name, None);
    }

    #[test]
    fn failed_response_carries_error_code() {
        let response = CompositeResponse::failed(&MaskError::EmptyMask);
        assert!(!response.success);
        assert_eq!(
            response.error.map(|error| error.code),
            Some("EmptyMask".to_string())
        );
    }
}
