use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::api::rest::caller;
use crate::engine::catalog::ListingDraft;
use crate::engine::workflow::publish_listing;
use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/products", post(create_product).get(search_products))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(draft): Json<ListingDraft>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let farmer = caller(&state, &headers)?;
    let product = publish_listing(&state, &farmer, draft)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Product>> {
    let needle = query
        .q
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut products: Vec<Product> = state
        .products
        .list()
        .into_iter()
        .filter(|product| match &needle {
            Some(needle) => product.name.to_lowercase().contains(needle),
            None => true,
        })
        .collect();
    products.sort_by(|a, b| b.listed_at.cmp(&a.listed_at));

    Json(products)
}
