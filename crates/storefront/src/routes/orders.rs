//! Order history and checkout route handlers.
//!
//! Checkout is simulated: the current cart is snapshotted into an order row
//! and the cart is cleared in the same transaction.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse},
};
use serde::Serialize;
use tracing::instrument;

use crate::commerce::Order;
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Response for `GET /api/orders`.
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

/// Response for `POST /api/checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
}

/// Order history, newest first.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let orders = state.commerce().orders(auth.map(|u| u.id)).await?;
    Ok(Json(OrdersResponse { orders }))
}

/// Snapshot the cart into an order and clear it.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let order_id = state.commerce().place_order(Some(user.id)).await?;

    Ok((
        StatusCode::CREATED,
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        Json(CheckoutResponse {
            order_id: order_id.to_string(),
        }),
    ))
}
