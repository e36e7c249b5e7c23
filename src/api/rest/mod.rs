pub mod admin;
pub mod orders;
pub mod products;
pub mod users;
pub mod views;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::engine::workflow::resolve_actor;
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

pub const ACTOR_HEADER: &str = "x-actor-id";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(users::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(views::router())
        .merge(admin::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Looks up the user named by the `x-actor-id` header.
pub fn caller(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let raw = headers
        .get(ACTOR_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("{ACTOR_HEADER} header is required")))?;
    let actor_id = raw
        .to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or_else(|| AppError::Unauthorized(format!("{ACTOR_HEADER} is not a valid id")))?;

    resolve_actor(state, actor_id)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    users: usize,
    products: usize,
    orders: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        users: state.users.len(),
        products: state.products.len(),
        orders: state.ledger.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
