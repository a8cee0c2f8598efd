//! Movement append route.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use till_core::ledger::AppendMovementInput;
use till_shared::types::CashRegisterId;
use uuid::Uuid;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the movement routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/cash-registers/{id}/movements", post(append_movement))
}

/// POST `/cash-registers/{id}/movements` - Append a movement to an open register.
async fn append_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppendMovementInput>,
) -> Result<impl IntoResponse, ApiError> {
    let movement = state
        .ledger
        .append(CashRegisterId::from_uuid(id), payload, auth.user())
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}
