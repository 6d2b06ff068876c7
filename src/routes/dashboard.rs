use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Dashboard Router Module
///
/// Seller dashboard views, mounted under `/dashboard` and gated by the request
/// interceptor exactly like the `/seller` area.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard/stats — storefront counters.
        .route("/stats", get(handlers::get_dashboard_stats))
        // GET /dashboard/vouchers — voucher list with usage counts.
        .route("/vouchers", get(handlers::get_dashboard_vouchers))
}
