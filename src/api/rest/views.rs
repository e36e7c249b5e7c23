use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::api::rest::caller;
use crate::engine::projections::{
    cards, consumer_orders, delivery_board, delivery_summary, farmer_orders, farmer_products,
    farmer_summary, DeliverySummary, FarmerSummary, OrderCard,
};
use crate::engine::workflow::require_role;
use crate::error::AppError;
use crate::models::product::Product;
use crate::models::user::Role;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/views/farmer", get(farmer_view))
        .route("/views/consumer", get(consumer_view))
        .route("/views/delivery", get(delivery_view))
}

#[derive(Serialize)]
pub struct FarmerView {
    pub summary: FarmerSummary,
    pub products: Vec<Product>,
    pub orders: Vec<OrderCard>,
}

#[derive(Serialize)]
pub struct ConsumerView {
    pub orders: Vec<OrderCard>,
}

#[derive(Serialize)]
pub struct DeliveryView {
    pub summary: DeliverySummary,
    pub available: Vec<OrderCard>,
    pub active: Vec<OrderCard>,
    pub history: Vec<OrderCard>,
}

async fn farmer_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<FarmerView>, AppError> {
    let farmer = caller(&state, &headers)?;
    require_role(&farmer, Role::Farmer)?;

    let own = farmer_orders(&state.ledger.list(), farmer.id);
    let summary = farmer_summary(&own, state.config.platform_fee);

    Ok(Json(FarmerView {
        summary,
        products: farmer_products(state.products.list(), farmer.id),
        orders: cards(own, Role::Farmer, state.config.delivery_eta_minutes),
    }))
}

async fn consumer_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ConsumerView>, AppError> {
    let consumer = caller(&state, &headers)?;
    require_role(&consumer, Role::Consumer)?;

    let own = consumer_orders(&state.ledger.list(), consumer.id);
    Ok(Json(ConsumerView {
        orders: cards(own, Role::Consumer, state.config.delivery_eta_minutes),
    }))
}

async fn delivery_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DeliveryView>, AppError> {
    let partner = caller(&state, &headers)?;
    require_role(&partner, Role::Delivery)?;

    let board = delivery_board(&state.ledger.list(), partner.id);
    let summary = delivery_summary(&board, partner.rating);
    let eta = state.config.delivery_eta_minutes;

    Ok(Json(DeliveryView {
        summary,
        available: cards(board.available, Role::Delivery, eta),
        active: cards(board.active, Role::Delivery, eta),
        history: cards(board.history, Role::Delivery, eta),
    }))
}
