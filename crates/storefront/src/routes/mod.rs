//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Auth
//! POST /auth/register          - Register with email/password
//! POST /auth/login             - Login
//! POST /auth/logout            - Logout
//!
//! # Products (public)
//! GET  /api/products           - Product catalog with resolved image URLs
//!
//! # Cart (requires auth for writes)
//! GET  /api/cart               - Cart contents
//! PUT  /api/cart               - Set a product's quantity (0 removes)
//! GET  /api/cart/count         - Total units in the cart
//!
//! # Wishlist (requires auth for writes)
//! GET  /api/wishlist           - Wishlist contents
//! PUT  /api/wishlist           - Set a product's membership
//! POST /api/wishlist/toggle    - Flip a product's membership
//! GET  /api/wishlist/count     - Number of wishlisted products
//!
//! # Orders
//! GET  /api/orders             - Order history, newest first
//! POST /api/checkout           - Snapshot the cart into an order
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).put(cart::set_quantity))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show).put(wishlist::set))
        .route("/toggle", post(wishlist::toggle))
        .route("/count", get(wishlist::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/api/products", get(products::index))
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .route("/api/orders", get(orders::index))
        .route("/api/checkout", post(orders::checkout))
}
