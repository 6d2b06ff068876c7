use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Seller Router Module
///
/// Product management for sellers, mounted under `/seller`.
///
/// Access control: this router is layered with the request interceptor in
/// `create_router`. A request only reaches these handlers with an authenticated
/// SELLER session; anything else was already redirected to the site root.
/// Handlers still take `SessionUser` to scope queries to the owner.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        // GET /seller/products — the seller's own listings, including inactive ones.
        // POST /seller/products — create a new listing owned by the session user.
        .route(
            "/products",
            get(handlers::get_seller_products).post(handlers::create_seller_product),
        )
}
