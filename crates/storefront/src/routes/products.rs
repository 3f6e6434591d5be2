//! Product catalog route handlers.
//!
//! The catalog is public: no session is consulted, and responses come from
//! the same cached commerce layer the cart and wishlist read through.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use crate::commerce::Product;
use crate::error::Result;
use crate::state::AppState;

/// Response for `GET /api/products`.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// List the product catalog with resolved image URLs.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = state.commerce().products().await?;
    Ok(Json(ProductsResponse { products }))
}
