use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use log::{error, info, warn};
use maskpaint_shared::composite::composite_base64;
use maskpaint_shared::{
    CompositeRequest, CompositeResponse, ConfirmMaskRequest, ConfirmMaskResponse, MaskError,
    OpenToolRequest, OpenToolResponse, SessionInfoResponse,
};

use crate::logic::{inspect_initial_image, prepare_mask, unix_millis};
use crate::sessions::{create_session, find_session, normalize_session_id, record_saved_mask};
use crate::state::{AppState, Session};

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn session_handler(
    Path(session_id): Path<String>,
    axum::Extension(index_file): axum::Extension<std::path::PathBuf>,
) -> impl IntoResponse {
    if normalize_session_id(&session_id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    match tokio::fs::read_to_string(&index_file).await {
        Ok(contents) => Html(contents).into_response(),
        Err(error) => {
            error!("Failed to read {}: {error}", index_file.display());
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Entry point for other tools: registers the image and hands back the editor URL.
pub async fn open_handler(
    State(state): State<AppState>,
    Json(request): Json<OpenToolRequest>,
) -> Json<OpenToolResponse> {
    let image = match request.initial_image.clone() {
        Some(initial_image) => {
            match run_blocking(move || inspect_initial_image(&initial_image)).await {
                Ok(info) => Some(info),
                Err(error) => {
                    warn!("Rejected opener image: {error}");
                    return Json(OpenToolResponse::failed(&error));
                }
            }
        }
        None => None,
    };
    let session_id = create_session(
        &state,
        Session::new(request.initial_image, request.file_name),
    )
    .await;
    Json(OpenToolResponse {
        success: true,
        url: Some(format!("/s/{session_id}")),
        session_id: Some(session_id),
        image,
        error: None,
    })
}

pub async fn session_info_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SessionInfoResponse>, StatusCode> {
    let session_id = normalize_session_id(&session_id).ok_or(StatusCode::NOT_FOUND)?;
    let session = find_session(&state, &session_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    let mut session = session.write().await;
    session.last_seen = Instant::now();
    Ok(Json(SessionInfoResponse {
        success: true,
        has_image: session.initial_image.is_some(),
        initial_image: session.initial_image.clone(),
        file_name: session.file_name.clone(),
        saved_masks: session.saved_masks.clone(),
    }))
}

pub async fn confirm_mask_handler(
    State(state): State<AppState>,
    Json(request): Json<ConfirmMaskRequest>,
) -> Json<ConfirmMaskResponse> {
    match save_mask(&state, request).await {
        Ok(response) => Json(response),
        Err(error) => {
            warn!("Mask rejected code={} reason={error}", error.code());
            Json(ConfirmMaskResponse::failed(&error))
        }
    }
}

async fn save_mask(
    state: &AppState,
    request: ConfirmMaskRequest,
) -> Result<ConfirmMaskResponse, MaskError> {
    let session_id = request.session_id.clone();
    let millis = unix_millis();
    let prepared = run_blocking(move || prepare_mask(&request, millis)).await?;
    let file_path = state
        .storage
        .save_mask(&prepared.file_name, &prepared.bytes)
        .await?;
    info!(
        "Mask saved file={file_path} width={} height={} bytes={}",
        prepared.width,
        prepared.height,
        prepared.bytes.len()
    );
    if let Some(session_id) = session_id {
        record_saved_mask(state, &session_id, &file_path).await;
    }
    Ok(ConfirmMaskResponse {
        success: true,
        file_path: Some(file_path),
        file_name: Some(prepared.file_name),
        width: Some(prepared.width),
        height: Some(prepared.height),
        error: None,
    })
}

pub async fn composite_handler(Json(request): Json<CompositeRequest>) -> Json<CompositeResponse> {
    let CompositeRequest { image, mask } = request;
    match run_blocking(move || composite_base64(&image, &mask)).await {
        Ok(result) => Json(CompositeResponse::ok(result)),
        Err(error) => {
            warn!("Composite failed code={} reason={error}", error.code());
            Json(CompositeResponse::failed(&error))
        }
    }
}

/// Image decoding is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, MaskError>
where
    F: FnOnce() -> Result<T, MaskError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MaskError::DecodeFailure(format!("image worker failed: {e}")))?
}
