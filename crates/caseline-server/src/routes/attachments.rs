use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use caseline_core::attachment::DEFAULT_MIME_TYPE;
use tracing::{error, warn};

use super::{api_error, internal_error, ApiError, AppState};

const DOWNLOAD_FAILED: &str = "Failed to download attachment";

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/confirmations/attachments/{attachment_id}/download",
        get(download_attachment),
    )
}

async fn download_attachment(
    State(state): State<AppState>,
    Path(attachment_id): Path<String>,
) -> Result<Response, ApiError> {
    serve_attachment(&state, &attachment_id).await
}

fn not_found() -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "Attachment not found or has no binary data",
    )
}

fn failed(attachment_id: &str, e: impl std::fmt::Display) -> ApiError {
    error!("downloading attachment {attachment_id} failed: {e}");
    internal_error(&e.to_string(), DOWNLOAD_FAILED)
}

pub(crate) async fn serve_attachment(
    state: &AppState,
    attachment_id: &str,
) -> Result<Response, ApiError> {
    if attachment_id.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing attachmentId"));
    }

    let blob = state
        .db
        .get_attachment_blob(attachment_id)
        .await
        .map_err(|e| failed(attachment_id, e))?
        .ok_or_else(not_found)?;

    let bytes = blob
        .decode()
        .map_err(|e| failed(attachment_id, e))?
        .ok_or_else(not_found)?;

    let content_type = HeaderValue::from_str(blob.content_type()).unwrap_or_else(|_| {
        warn!(
            "attachment {attachment_id} has unusable mime type {:?}, using {DEFAULT_MIME_TYPE}",
            blob.content_type()
        );
        HeaderValue::from_static(DEFAULT_MIME_TYPE)
    });
    let disposition = HeaderValue::from_bytes(blob.content_disposition().as_bytes())
        .map_err(|e| failed(attachment_id, e))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| failed(attachment_id, e))
}
