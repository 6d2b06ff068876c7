use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Auth Router Module
///
/// The authentication infrastructure, mounted under `/api/auth`. The path
/// classifier puts this prefix first, so these endpoints can never be caught by
/// the seller gate: a signed-out user must always be able to reach login.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        // POST /api/auth/login
        // Credential check + session token issuance.
        .route("/login", post(handlers::login))
        // GET /api/auth/session
        // Current identity, or null for anonymous callers. Never rejects.
        .route("/session", get(handlers::get_session))
}
