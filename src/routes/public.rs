use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without any session. Catalog readers enforce
/// `is_active = true` at the repository level, so nothing hidden leaks to
/// anonymous browsers.
///
/// Note on `/api/vouchers/use`: it lives here because it is not under a protected
/// path prefix, but the handler itself requires a session (401 otherwise). The
/// interceptor never sees this route.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/register
        // Creates a CUSTOMER account. Validation and conflict rules live in the handler.
        .route("/api/register", post(handlers::register_user))
        // GET /api/categories, /api/materials
        // Active catalog dimensions, ordered for display.
        .route("/api/categories", get(handlers::get_categories))
        .route("/api/materials", get(handlers::get_materials))
        // GET /api/products?category=&material=&search=
        // Active products with optional filters.
        .route("/api/products", get(handlers::get_products))
        // GET /api/products/featured
        // The storefront's featured strip.
        .route("/api/products/featured", get(handlers::get_featured_products))
        // GET /api/products/{id}
        // Single product detail; inactive products read as 404.
        .route("/api/products/{id}", get(handlers::get_product_details))
        // POST /api/vouchers/use
        // Session-gated in the handler, not by the interceptor.
        .route("/api/vouchers/use", post(handlers::use_voucher))
}
