//! Receipt handlers
//!
//! Uploads land in the receipt store; transactions reference them by their
//! public `/uploads/<file>` path.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::warn;

use crate::{AppError, AppState, CurrentUser, MessageResponse};
use tally_core::receipts::{ReceiptStore, StoredReceipt};

/// Multipart field carrying the image
const RECEIPT_FIELD: &str = "receipt";

/// POST /api/receipts/upload - Upload a receipt image
pub async fn upload_receipt(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StoredReceipt>, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::bad_request("No file uploaded"))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?
    {
        if field.name() != Some(RECEIPT_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("File too large (max 5MB)"))?;

        upload = Some((original_name, content_type, bytes));
        break;
    }

    let (original_name, content_type, bytes) =
        upload.ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    let stored = state.receipts.save(
        current.id(),
        &original_name,
        content_type.as_deref(),
        &bytes,
    )?;

    state.db.log_audit(
        current.id(),
        "upload",
        Some("receipt"),
        None,
        Some(&format!("file={}, size={}", stored.filename, bytes.len())),
    )?;

    Ok(Json(stored))
}

/// GET /uploads/:filename - Serve a receipt image to its owner
pub async fn serve_receipt(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = state.receipts.owned_file(current.id(), &filename)?;

    let bytes = std::fs::read(&path)
        .map_err(|e| AppError::internal(&format!("Failed to read receipt: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, ReceiptStore::content_type(&filename)),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/receipts/:filename - Delete a receipt and detach it from transactions
pub async fn delete_receipt(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if let Err(e) = state.receipts.delete(current.id(), &filename) {
        if matches!(e, tally_core::Error::Forbidden(_)) {
            warn!(user = %current.user.email, file = %filename, "Attempt to delete another user's receipt");
        }
        return Err(e.into());
    }

    let detached = state
        .db
        .clear_receipt_path(current.id(), &ReceiptStore::public_path(&filename))?;

    state.db.log_audit(
        current.id(),
        "delete",
        Some("receipt"),
        None,
        Some(&format!("file={}, detached={}", filename, detached)),
    )?;

    Ok(MessageResponse::new("Receipt deleted"))
}
