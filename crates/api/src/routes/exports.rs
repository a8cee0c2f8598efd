//! Statement export routes.

use axum::{
    Router,
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};
use till_core::export::ExportFormat;
use till_shared::types::CashRegisterId;
use uuid::Uuid;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the export routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash-registers/{id}/export/pdf", get(export_pdf))
        .route("/cash-registers/{id}/export/excel", get(export_excel))
}

async fn export_pdf(
    state: State<AppState>,
    auth: AuthUser,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    export(state, auth, id, ExportFormat::Pdf).await
}

async fn export_excel(
    state: State<AppState>,
    auth: AuthUser,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    export(state, auth, id, ExportFormat::Excel).await
}

/// Serves the cached statement, rendering it on a miss.
async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    format: ExportFormat,
) -> Result<impl IntoResponse, ApiError> {
    let artifact = state
        .exports
        .get_or_render(CashRegisterId::from_uuid(id), format, auth.user())
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.filename());
    Ok((
        [
            (CONTENT_TYPE, artifact.content_type().to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    ))
}
