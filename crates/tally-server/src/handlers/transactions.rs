//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::{parse_json_body, parse_period};
use crate::{AppError, AppState, CurrentUser, MessageResponse};
use tally_core::models::{
    format_cents, NewTransaction, Transaction, TransactionFilter, TransactionInput,
    TransactionType, TransactionUpdate,
};

/// Query parameters for listing transactions
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub month: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

/// GET /api/transactions - List the caller's transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let filter = TransactionFilter {
        period: parse_period(params.month.as_deref(), params.year.as_deref())?,
        // Unknown types are ignored rather than rejected
        transaction_type: params
            .transaction_type
            .as_deref()
            .and_then(|t| t.parse::<TransactionType>().ok()),
    };

    let transactions = state.db.list_transactions(current.id(), filter)?;

    let mut details = format!("count={}", transactions.len());
    if let Some(period) = filter.period {
        details.push_str(&format!(", month={}", period));
    }
    if let Some(t) = filter.transaction_type {
        details.push_str(&format!(", type={}", t));
    }
    state.db.log_audit(
        current.id(),
        "list",
        Some("transaction"),
        None,
        Some(&details),
    )?;

    Ok(Json(transactions))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let tx = state
        .db
        .get_transaction(current.id(), id)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    state
        .db
        .log_audit(current.id(), "get", Some("transaction"), Some(id), None)?;

    Ok(Json(tx))
}

/// POST /api/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let input: TransactionInput = parse_json_body(request).await?;
    let new_tx = NewTransaction::try_from(input)?;

    let tx = state.db.create_transaction(current.id(), &new_tx)?;

    state.db.log_audit(
        current.id(),
        "create",
        Some("transaction"),
        Some(tx.id),
        Some(&format!(
            "type={}, amount={}, date={}",
            tx.transaction_type,
            format_cents(tx.amount_cents),
            tx.transaction_date
        )),
    )?;

    Ok((StatusCode::CREATED, Json(tx)))
}

/// PUT /api/transactions/:id - Partially update a transaction
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let input: TransactionInput = parse_json_body(request).await?;
    let update = TransactionUpdate::try_from(input)?;

    let tx = state
        .db
        .update_transaction(current.id(), id, &update)?
        .ok_or_else(|| AppError::not_found("Transaction not found"))?;

    state
        .db
        .log_audit(current.id(), "update", Some("transaction"), Some(id), None)?;

    Ok(Json(tx))
}

/// DELETE /api/transactions/:id - Delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.db.delete_transaction(current.id(), id)? {
        return Err(AppError::not_found("Transaction not found"));
    }

    state
        .db
        .log_audit(current.id(), "delete", Some("transaction"), Some(id), None)?;

    Ok(MessageResponse::new("Transaction deleted"))
}
