//! Wishlist route handlers.
//!
//! Membership is set with an explicit target state (`PUT`), with a
//! convenience toggle layered on top. Mutations answer with an `HX-Trigger`
//! header so badge listeners re-fetch the count.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::ProductId;

use crate::commerce::WishlistEntry;
use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Body for `PUT /api/wishlist`.
#[derive(Debug, Deserialize)]
pub struct SetMembershipBody {
    pub product_id: ProductId,
    pub wanted: bool,
}

/// Body for `POST /api/wishlist/toggle`.
#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub product_id: ProductId,
}

/// Response for `POST /api/wishlist/toggle`.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub wanted: bool,
}

/// Response for `GET /api/wishlist`.
#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub entries: Vec<WishlistEntry>,
}

/// Response for `GET /api/wishlist/count`.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Wishlist contents for the current user.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let entries = state.commerce().wishlist(auth.map(|u| u.id)).await?;
    Ok(Json(WishlistResponse { entries }))
}

/// Set a product's wishlist membership to an explicit state.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<SetMembershipBody>,
) -> Result<impl IntoResponse> {
    state
        .commerce()
        .set_wishlisted(Some(user.id), &body.product_id, body.wanted)
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([("HX-Trigger", "wishlist-updated")]),
    ))
}

/// Flip a product's wishlist membership and report the new state.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ToggleBody>,
) -> Result<impl IntoResponse> {
    let wanted = state
        .commerce()
        .toggle_wishlist(Some(user.id), &body.product_id)
        .await?;

    Ok((
        AppendHeaders([("HX-Trigger", "wishlist-updated")]),
        Json(ToggleResponse { wanted }),
    ))
}

/// Number of wishlisted products (navigation badge).
#[instrument(skip(state, auth))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let count = state.commerce().wishlist_count(auth.map(|u| u.id)).await?;
    Ok(Json(CountResponse { count }))
}
