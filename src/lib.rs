use axum::{
    Router,
    extract::{FromRef, FromRequestParts, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;

// Routing segregation (Auth, Public, Seller, Dashboard).
pub mod routes;
use auth::SessionUser;
use policy::{Decision, PathClass};
use routes::{auth as auth_routes, dashboard, public, seller};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates the OpenAPI documentation for every annotated handler and schema.
/// Served as JSON at `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login, handlers::get_session,
        handlers::get_categories, handlers::get_materials, handlers::get_products,
        handlers::get_featured_products, handlers::get_product_details,
        handlers::use_voucher, handlers::get_seller_products,
        handlers::create_seller_product, handlers::get_dashboard_stats,
        handlers::get_dashboard_vouchers
    ),
    components(
        schemas(
            models::User, models::Category, models::Material, models::Product,
            models::Voucher, models::RegisterRequest, models::LoginRequest,
            models::LoginResponse, models::UseVoucherRequest,
            models::CreateProductRequest, models::DashboardStats,
            models::ErrorMessage, auth::Role, auth::SessionUser,
        )
    ),
    tags(
        (name = "bijou-store", description = "Jewelry storefront API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container for application services and configuration,
/// cloned per request by axum.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: persistence behind `Arc<dyn Repository>`.
    pub repo: RepositoryState,
    /// Loaded, immutable environment configuration.
    pub config: AppConfig,
}

// FromRef implementations let extractors pull individual components out of the
// shared state without depending on the whole of it.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// route_guard
///
/// The request interceptor for the protected areas. Layered over the `/dashboard`
/// and `/seller` routers only, so public paths never pass through here; the
/// policy's `Public` arm is defense-in-depth for a wider mounting.
///
/// Per request it:
/// 1. classifies the path (auth infrastructure is forwarded untouched),
/// 2. resolves the session, treating any extraction failure as "no session",
/// 3. evaluates the authorization policy and either forwards the request or
///    short-circuits with a redirect to the site root.
///
/// The denial cause (missing session vs. wrong role) is logged but produces the
/// same redirect either way. No state is mutated.
async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let class = policy::classify(&path);

    // Auth endpoints pass without even looking at the session.
    if class == PathClass::AuthInfrastructure {
        return next.run(request).await;
    }

    // Resolve the session, if any. A rejected extraction (no header, bad token,
    // deleted account) is an absent session, not an error.
    let (mut parts, body) = request.into_parts();
    let session = SessionUser::from_request_parts(&mut parts, &state).await.ok();
    let request = Request::from_parts(parts, body);

    match policy::evaluate(class, session.as_ref()) {
        Decision::Allow => next.run(request).await,
        Decision::DenyRedirect { target, cause } => {
            tracing::debug!(path = %path, cause = ?cause, "protected area access denied");
            Redirect::to(target).into_response()
        }
    }
}

/// create_router
///
/// Assembles the full routing structure: docs, the open surface, the auth
/// infrastructure, and the gated areas, then wraps everything in the
/// observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // The protected areas share one interceptor layer. It is applied to the
    // outer router AFTER nesting so it sees the full original path, and it
    // covers every sub-path of the two prefixes whether or not a concrete
    // route exists underneath.
    let protected = Router::new()
        .nest("/dashboard", dashboard::dashboard_routes())
        .nest("/seller", seller::seller_routes())
        .layer(middleware::from_fn_with_state(state.clone(), route_guard));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Open storefront surface: no middleware.
        .merge(public::public_routes())
        // Auth infrastructure: mounted under the always-allowed prefix.
        .nest("/api/auth", auth_routes::auth_routes())
        // Gated areas.
        .merge(protected)
        .with_state(state);

    // Request correlation and tracing, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: includes the generated `x-request-id` so every
/// log line of a request correlates to one ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
