use maskpaint_shared::data_url::decode_base64_payload;
use maskpaint_shared::{
    ConfirmMaskRequest, ConfirmMaskResponse, ErrorBody, MaskError, SessionInfoResponse,
};

pub const CONFIRM_ENDPOINT: &str = "/api/mask";

pub fn session_info_url(session_id: &str) -> String {
    format!("/api/session/{session_id}")
}

/// Session id from a `/s/<id>` page path.
pub fn session_id_from_path(path: &str) -> Option<String> {
    let mut parts = path.trim_matches('/').split('/');
    if parts.next()? != "s" {
        return None;
    }
    let session_id = parts.next()?;
    if session_id.is_empty() {
        None
    } else {
        Some(session_id.to_string())
    }
}

pub fn confirm_body(request: &ConfirmMaskRequest) -> Result<String, MaskError> {
    serde_json::to_string(request).map_err(|e| MaskError::InvalidMaskEncoding(e.to_string()))
}

/// Parses the server's answer to a confirm. A `success: false` body becomes its error.
pub fn parse_confirm_response(text: &str) -> Result<ConfirmMaskResponse, MaskError> {
    let response: ConfirmMaskResponse = serde_json::from_str(text)
        .map_err(|e| MaskError::StorageUnavailable(format!("unreadable server response: {e}")))?;
    if response.success {
        Ok(response)
    } else {
        Err(server_error(response.error.as_ref()))
    }
}

/// The image a tool-open session was started with, decoded from its data URL.
pub fn initial_image_bytes(text: &str) -> Result<Option<(Vec<u8>, Option<String>)>, MaskError> {
    let info: SessionInfoResponse = serde_json::from_str(text)
        .map_err(|e| MaskError::DecodeFailure(format!("unreadable session info: {e}")))?;
    if !info.success || !info.has_image {
        return Ok(None);
    }
    let Some(image) = info.initial_image else {
        return Ok(None);
    };
    let bytes = decode_base64_payload(&image)?;
    Ok(Some((bytes, info.file_name)))
}

fn server_error(body: Option<&ErrorBody>) -> MaskError {
    match body {
        Some(body) => MaskError::from_code(&body.code, &body.message),
        None => MaskError::StorageUnavailable("server reported failure without details".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_comes_from_share_path() {
        assert_eq!(session_id_from_path("/s/abc-123"), Some("abc-123".into()));
        assert_eq!(session_id_from_path("/s/abc/extra"), Some("abc".into()));
        assert_eq!(session_id_from_path("/s/"), None);
        assert_eq!(session_id_from_path("/"), None);
        assert_eq!(session_id_from_path("/other/abc"), None);
    }

    #[test]
    fn confirm_success_is_returned() {
        let response = parse_confirm_response(concat!(
            r#"{"success":true,"filePath":"out/a_mask_1.png","#,
            r#""fileName":"a_mask_1.png","width":4,"height":2}"#
        ))
        .unwrap();
        assert_eq!(response.file_name.as_deref(), Some("a_mask_1.png"));
        assert_eq!(response.width, Some(4));
    }

    #[test]
    fn confirm_failure_maps_back_to_error_kind() {
        let error = parse_confirm_response(
            r#"{"success":false,"error":{"code":"InvalidMaskEncoding","message":"bad"}}"#,
        )
        .unwrap_err();
        assert_eq!(error, MaskError::InvalidMaskEncoding("bad".into()));
        assert_eq!(
            parse_confirm_response("not json").unwrap_err().code(),
            "StorageUnavailable"
        );
    }

    #[test]
    fn session_info_lives_under_the_api() {
        assert_eq!(session_info_url("abc-123"), "/api/session/abc-123");
    }

    #[test]
    fn session_info_yields_initial_image() {
        let found = initial_image_bytes(concat!(
            r#"{"success":true,"hasImage":true,"#,
            r#""initialImage":"data:image/png;base64,SGVsbG8=","fileName":"a.png"}"#
        ))
        .unwrap();
        assert_eq!(found, Some((b"Hello".to_vec(), Some("a.png".to_string()))));
        assert_eq!(
            initial_image_bytes(r#"{"success":true,"hasImage":false}"#).unwrap(),
            None
        );
    }
}
