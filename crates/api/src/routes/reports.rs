//! Closed-register report route.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use till_core::reports::RangeParams;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/cash-register-reports", get(closed_registers))
}

/// Query parameters for the closed-register report.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// `day`, `week`, `month` or `year`.
    pub period: String,
    /// Window parameters for the period.
    #[serde(flatten)]
    pub params: RangeParams,
}

/// GET `/cash-register-reports` - Closed registers of every accessible shop.
async fn closed_registers(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .reports
        .closed_registers(&query.period, &query.params, auth.user())
        .await?;
    Ok(Json(report))
}
