use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::caller;
use crate::engine::workflow::{
    capture_payment, place_order, rate_delivered_order, request_transition, view_order,
    CheckoutRequest,
};
use crate::error::AppError;
use crate::models::actor::Actor;
use crate::models::order::{Order, OrderStatus, PaymentMethod};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_status))
        .route("/orders/:id/payment", post(pay_order))
        .route("/orders/:id/rating", post(rate_order))
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
}

#[derive(Deserialize)]
pub struct RatingRequest {
    pub rating: u8,
    pub feedback: Option<String>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let consumer = caller(&state, &headers)?;
    let order = place_order(&state, &consumer, payload)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Order>, AppError> {
    let viewer = caller(&state, &headers)?;
    Ok(Json(view_order(&state, id, &viewer)?))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Order>, AppError> {
    let actor = Actor::from_user(&caller(&state, &headers)?);
    let order = request_transition(&state, id, payload.status, &actor)?;
    Ok(Json(order))
}

async fn pay_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<Order>, AppError> {
    let actor = Actor::from_user(&caller(&state, &headers)?);
    let order = capture_payment(&state, id, &actor, payload.method).await?;
    Ok(Json(order))
}

async fn rate_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<RatingRequest>,
) -> Result<Json<Order>, AppError> {
    let actor = Actor::from_user(&caller(&state, &headers)?);
    let order = rate_delivered_order(&state, id, &actor, payload.rating, payload.feedback)?;
    Ok(Json(order))
}
