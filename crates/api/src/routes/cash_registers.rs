//! Cash register lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use till_core::register::{
    CashRegister, CloseRegisterInput, DifferenceStatus, HISTORY_LIMIT, HistoryFilter,
    OpenRegisterInput,
};
use till_shared::types::{CashRegisterId, ShopId, UserId};
use uuid::Uuid;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the cash register routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shops/{shop_id}/cash-registers", post(open_register))
        .route("/shops/{shop_id}/cash-registers/current", get(current_register))
        .route("/shops/{shop_id}/cash-registers/history", get(register_history))
        .route("/cash-registers/{id}", get(register_detail))
        .route("/cash-registers/{id}/close", patch(close_register))
}

/// Request body for opening a register.
#[derive(Debug, Deserialize)]
pub struct OpenRegisterRequest {
    /// Cash placed in the drawer.
    pub opening_amount: Decimal,
    /// Operator, when different from the caller.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
}

/// Query parameters for register history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// First local day (YYYY-MM-DD).
    pub start_date: Option<NaiveDate>,
    /// Last local day (YYYY-MM-DD).
    pub end_date: Option<NaiveDate>,
}

/// Register summary with its reconciliation outcome.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The register.
    #[serde(flatten)]
    pub register: CashRegister,
    /// Surplus, shortage or exact. Absent while open.
    pub difference_status: Option<DifferenceStatus>,
}

impl From<CashRegister> for RegisterResponse {
    fn from(register: CashRegister) -> Self {
        let difference_status = register.difference_status();
        Self {
            register,
            difference_status,
        }
    }
}

/// POST `/shops/{shop_id}/cash-registers` - Open a register.
async fn open_register(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<Uuid>,
    Json(payload): Json<OpenRegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = OpenRegisterInput {
        shop_id: ShopId::from_uuid(shop_id),
        employee_id: payload.employee_id.map(UserId::from_uuid),
        opening_amount: payload.opening_amount,
    };

    let register = state.registers.open(input, auth.user()).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse::from(register))))
}

/// PATCH `/cash-registers/{id}/close` - Close and reconcile a register.
///
/// Distribution runs detached; its outcome never affects this response.
async fn close_register(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseRegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let id = CashRegisterId::from_uuid(id);
    let register = state.registers.close(id, payload, auth.user()).await?;

    let notifier = state.notifier.clone();
    let user = auth.0;
    tokio::spawn(async move {
        notifier.on_close(id, &user).await;
    });

    info!(register_id = %id, "close accepted, distribution scheduled");
    Ok(Json(RegisterResponse::from(register)))
}

/// GET `/shops/{shop_id}/cash-registers/current` - The open register, if any.
async fn current_register(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state
        .registers
        .current_open(ShopId::from_uuid(shop_id), auth.user())
        .await?;

    let message = if snapshot.is_some() {
        "Open cash register found"
    } else {
        "No open cash register for this shop"
    };

    Ok(Json(json!({ "register": snapshot, "message": message })))
}

/// GET `/shops/{shop_id}/cash-registers/history` - Newest registers first.
async fn register_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(shop_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = HistoryFilter::from_local_dates(
        query.start_date,
        query.end_date,
        state.formatter.timezone(),
    );

    let registers: Vec<RegisterResponse> = state
        .registers
        .history(ShopId::from_uuid(shop_id), filter, auth.user())
        .await?
        .into_iter()
        .map(RegisterResponse::from)
        .collect();

    Ok(Json(json!({
        "registers": registers,
        "limit": HISTORY_LIMIT,
    })))
}

/// GET `/cash-registers/{id}` - Full detail with running balances.
async fn register_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .registers
        .detail(CashRegisterId::from_uuid(id), auth.user())
        .await?;
    Ok(Json(detail))
}
