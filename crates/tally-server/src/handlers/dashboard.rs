//! Dashboard handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::parse_period;
use crate::{AppError, AppState, CurrentUser};
use tally_core::models::DashboardStats;

/// Query parameters for dashboard stats
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

/// GET /api/dashboard/stats - Totals, expense breakdown, and monthly trend
pub async fn get_dashboard_stats(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    let period = parse_period(params.month.as_deref(), params.year.as_deref())?;
    let today = chrono::Local::now().date_naive();

    let stats = state.db.get_dashboard_stats(current.id(), period, today)?;

    let scope = period
        .map(|p| p.to_string())
        .unwrap_or_else(|| "all".to_string());
    state.db.log_audit(
        current.id(),
        "view",
        Some("dashboard"),
        None,
        Some(&format!("month={}", scope)),
    )?;

    Ok(Json(stats))
}
