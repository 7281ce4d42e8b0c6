//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Extension, Json,
};

use super::parse_json_body;
use crate::{AppError, AppState, CurrentUser, MessageResponse};
use tally_core::models::{Category, CategoryInput, NewCategory};

/// GET /api/categories - List the caller's categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.db.list_categories(current.id())?;

    state.db.log_audit(
        current.id(),
        "list",
        Some("category"),
        None,
        Some(&format!("count={}", categories.len())),
    )?;

    Ok(Json(categories))
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let input: CategoryInput = parse_json_body(request).await?;
    let category = NewCategory::try_from(input)?;

    let created = state.db.create_category(current.id(), &category)?;

    state.db.log_audit(
        current.id(),
        "create",
        Some("category"),
        Some(created.id),
        Some(&format!("name={}, type={}", created.name, created.category_type)),
    )?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/categories/:id - Delete a category
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.db.delete_category(current.id(), id)? {
        return Err(AppError::not_found("Category not found"));
    }

    state
        .db
        .log_audit(current.id(), "delete", Some("category"), Some(id), None)?;

    Ok(MessageResponse::new("Category deleted"))
}
