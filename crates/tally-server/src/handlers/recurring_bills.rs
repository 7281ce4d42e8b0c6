//! Recurring bill handlers

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
    BillStatus, NewRecurringBill, RecurringBill, RecurringBillInput, RecurringBillUpdate,
};

/// Query parameters for the monthly bill view
#[derive(Debug, Default, Deserialize)]
pub struct BillMonthQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

/// GET /api/recurring-bills - List the caller's recurring bills
pub async fn list_recurring_bills(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<RecurringBill>>, AppError> {
    let bills = state.db.list_recurring_bills(current.id())?;

    state.db.log_audit(
        current.id(),
        "list",
        Some("recurring_bill"),
        None,
        Some(&format!("count={}", bills.len())),
    )?;

    Ok(Json(bills))
}

/// GET /api/recurring-bills/month - Bills with completion state for one month
pub async fn recurring_bills_for_month(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<BillMonthQuery>,
) -> Result<Json<Vec<BillStatus>>, AppError> {
    let month = params.month.as_deref().filter(|m| !m.trim().is_empty());
    let year = params.year.as_deref().filter(|y| !y.trim().is_empty());
    if month.is_none() || year.is_none() {
        return Err(AppError::bad_request("Month and year are required"));
    }
    let period = parse_period(month, year)?
        .ok_or_else(|| AppError::bad_request("Month and year are required"))?;

    let statuses = state.db.recurring_bills_for_month(current.id(), period)?;

    let complete = statuses.iter().filter(|s| s.is_complete).count();
    state.db.log_audit(
        current.id(),
        "list",
        Some("recurring_bill"),
        None,
        Some(&format!(
            "month={}, complete={}/{}",
            period,
            complete,
            statuses.len()
        )),
    )?;

    Ok(Json(statuses))
}

/// GET /api/recurring-bills/:id - Get a single recurring bill
pub async fn get_recurring_bill(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<RecurringBill>, AppError> {
    let bill = state
        .db
        .get_recurring_bill(current.id(), id)?
        .ok_or_else(|| AppError::not_found("Recurring bill not found"))?;

    state
        .db
        .log_audit(current.id(), "get", Some("recurring_bill"), Some(id), None)?;

    Ok(Json(bill))
}

/// POST /api/recurring-bills - Create a recurring bill
pub async fn create_recurring_bill(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<(StatusCode, Json<RecurringBill>), AppError> {
    let input: RecurringBillInput = parse_json_body(request).await?;
    let new_bill = NewRecurringBill::try_from(input)?;

    let bill = state.db.create_recurring_bill(current.id(), &new_bill)?;

    state.db.log_audit(
        current.id(),
        "create",
        Some("recurring_bill"),
        Some(bill.id),
        Some(&format!(
            "category={}, due_date={}",
            bill.category_name, bill.due_date
        )),
    )?;

    Ok((StatusCode::CREATED, Json(bill)))
}

/// PUT /api/recurring-bills/:id - Partially update a recurring bill
pub async fn update_recurring_bill(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<RecurringBill>, AppError> {
    let input: RecurringBillInput = parse_json_body(request).await?;
    let update = RecurringBillUpdate::try_from(input)?;

    let bill = state
        .db
        .update_recurring_bill(current.id(), id, &update)?
        .ok_or_else(|| AppError::not_found("Recurring bill not found"))?;

    state.db.log_audit(
        current.id(),
        "update",
        Some("recurring_bill"),
        Some(id),
        None,
    )?;

    Ok(Json(bill))
}

/// DELETE /api/recurring-bills/:id - Delete a recurring bill
pub async fn delete_recurring_bill(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.db.delete_recurring_bill(current.id(), id)? {
        return Err(AppError::not_found("Recurring bill not found"));
    }

    state.db.log_audit(
        current.id(),
        "delete",
        Some("recurring_bill"),
        Some(id),
        None,
    )?;

    Ok(MessageResponse::new("Recurring bill deleted"))
}
