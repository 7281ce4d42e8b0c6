//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod receipts;
pub mod recurring_bills;
pub mod transactions;

// Re-export all handlers for use in router
pub use audit::*;
pub use auth::*;
pub use categories::*;
pub use dashboard::*;
pub use receipts::*;
pub use recurring_bills::*;
pub use transactions::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_JSON_BODY};
use tally_core::models::MonthPeriod;

/// Read and parse a JSON request body, capped at `MAX_JSON_BODY`
pub(crate) async fn parse_json_body<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_JSON_BODY)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body or body too large"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

/// Parse `month`/`year` query values into an optional period
///
/// Blank values count as absent. Exactly one of the two is an error.
pub(crate) fn parse_period(
    month: Option<&str>,
    year: Option<&str>,
) -> Result<Option<MonthPeriod>, AppError> {
    let month = non_blank(month)
        .map(|m| {
            m.parse::<u32>()
                .map_err(|_| AppError::bad_request("Month must be between 1 and 12"))
        })
        .transpose()?;
    let year = non_blank(year)
        .map(|y| {
            y.parse::<i32>()
                .map_err(|_| AppError::bad_request("Invalid year"))
        })
        .transpose()?;

    Ok(MonthPeriod::from_parts(month, year)?)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
