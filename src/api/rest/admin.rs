use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::api::rest::caller;
use crate::engine::projections::{admin_overview, AdminOverview};
use crate::engine::workflow::require_role;
use crate::error::AppError;
use crate::models::effect::Notice;
use crate::models::user::Role;
use crate::notify::AdminEntry;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/overview", get(overview))
        .route("/admin/logs", get(logs))
        .route("/notifications", get(notifications))
}

async fn overview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AdminOverview>, AppError> {
    require_role(&caller(&state, &headers)?, Role::Admin)?;

    Ok(Json(admin_overview(
        &state.ledger.list(),
        state.users.len(),
        state.config.platform_fee,
    )))
}

async fn logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminEntry>>, AppError> {
    require_role(&caller(&state, &headers)?, Role::Admin)?;
    Ok(Json(state.sink.admin_log()))
}

async fn notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notice>>, AppError> {
    let user = caller(&state, &headers)?;
    Ok(Json(state.sink.inbox(&user.id)))
}
