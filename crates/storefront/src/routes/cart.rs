//! Cart route handlers.
//!
//! Reads go through the cached commerce layer and work without a session
//! (guests get an empty cart). Writes require a session and answer with an
//! `HX-Trigger` header so badge listeners re-fetch the count.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::ProductId;

use crate::commerce::CartLine;
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Body for `PUT /api/cart`.
#[derive(Debug, Deserialize)]
pub struct SetQuantityBody {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Response for `GET /api/cart`.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
}

/// Response for `GET /api/cart/count`.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u32,
}

/// Cart contents for the current user.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let lines = state.commerce().cart(auth.map(|u| u.id)).await?;
    Ok(Json(CartResponse { lines }))
}

/// Set a product's cart quantity. Zero removes the line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set_quantity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<SetQuantityBody>,
) -> Result<impl IntoResponse> {
    state
        .commerce()
        .set_cart_quantity(Some(user.id), &body.product_id, body.quantity)
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([("HX-Trigger", "cart-updated")]),
    ))
}

/// Total units across cart lines (navigation badge).
#[instrument(skip(state, auth))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let count = state.commerce().cart_count(auth.map(|u| u.id)).await?;
    Ok(Json(CountResponse { count }))
}
