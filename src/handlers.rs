use crate::{
    AppState,
    auth::{self, Role, SessionUser},
    models::{
        Category, CreateProductRequest, DashboardStats, ErrorMessage, LoginRequest, LoginResponse,
        Material, NewUser, Product, RegisterRequest, UseVoucherRequest, User, Voucher,
    },
    password,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// ProductFilter
///
/// Accepted query parameters for the public product listing (GET /api/products).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProductFilter {
    /// Restrict to one category.
    pub category: Option<Uuid>,
    /// Restrict to one material.
    pub material: Option<Uuid>,
    /// Case-insensitive match against name and description.
    pub search: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorMessage>);

fn bad_request(msg: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorMessage::new(msg)))
}

// --- Registration & Auth ---

/// register_user
///
/// [Public Route] Creates a CUSTOMER account.
///
/// Rejections, in order: 400 if any of username/email/password is missing or
/// blank (absent JSON fields deserialize as blank, so they land here too), 400 if
/// an account already uses the email or username (caught by the pre-check or by
/// the unique index at insert time), 500 if hashing or storage fails. On success
/// the created record is returned with 201; the password hash is excluded from
/// serialization at the model level.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Missing fields or conflicting account", body = ErrorMessage)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let username = payload.username.trim();
    let email = payload.email.trim();

    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(bad_request("username, email and password are required"));
    }

    // Conflict pre-check before insert: matched by email OR username.
    match state.repo.find_user_conflict(email, username).await {
        Ok(Some(_)) => {
            return Err(bad_request(
                "an account with this email or username already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("registration conflict check failed: {:?}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage::new("registration failed")),
            ));
        }
    }

    let password_hash = password::hash_password(&payload.password).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorMessage::new("registration failed")),
        )
    })?;

    let new_user = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        role: Role::Customer,
    };

    match state.repo.create_user(new_user).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        // A concurrent registration can slip between the pre-check and the
        // insert; the unique index reports it here instead.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(bad_request(
            "an account with this email or username already exists",
        )),
        Err(e) => {
            tracing::error!("user insert failed: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage::new("registration failed")),
            ))
        }
    }
}

/// login
///
/// [Auth Route] Verifies credentials and issues a session token. The identifier
/// matches either the username or the email. All credential failures collapse to
/// a single 401 so the response does not reveal which part was wrong.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let user = state
        .repo
        .find_user_by_login(payload.identifier.trim())
        .await
        .map_err(|e| {
            tracing::error!("login lookup failed: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !password::verify_password(&payload.password, &user.password_hash) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = auth::issue_session_token(user.id, &state.config.jwt_secret).map_err(|e| {
        tracing::error!("token signing failed: {:?}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(LoginResponse { token, user }))
}

/// get_session
///
/// [Auth Route] Returns the current session identity, or null when the request
/// carries no valid token. Never rejects: an anonymous caller asking "who am I"
/// is a normal question.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses((status = 200, description = "Current session or null", body = Option<SessionUser>))
)]
pub async fn get_session(
    session: Result<SessionUser, StatusCode>,
) -> Json<Option<SessionUser>> {
    Json(session.ok())
}

// --- Public Catalog ---

/// get_categories
///
/// [Public Route] Active categories, ordered for display.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Active categories", body = [Category]))
)]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, StatusCode> {
    match state.repo.get_categories().await {
        Ok(categories) => Ok(Json(categories)),
        Err(e) => {
            tracing::error!("get_categories error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// get_materials
///
/// [Public Route] Active materials, ordered for display.
#[utoipa::path(
    get,
    path = "/api/materials",
    responses((status = 200, description = "Active materials", body = [Material]))
)]
pub async fn get_materials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Material>>, StatusCode> {
    match state.repo.get_materials().await {
        Ok(materials) => Ok(Json(materials)),
        Err(e) => {
            tracing::error!("get_materials error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// get_products
///
/// [Public Route] Active products with optional category/material/search filters.
/// The `is_active = true` restriction lives in the repository's base query, so an
/// anonymous caller can never list hidden stock.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductFilter),
    responses((status = 200, description = "Filtered product list", body = [Product]))
)]
pub async fn get_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    match state
        .repo
        .get_products(filter.category, filter.material, filter.search)
        .await
    {
        Ok(products) => Ok(Json(products)),
        Err(e) => {
            tracing::error!("get_products error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// get_featured_products
///
/// [Public Route] The storefront's featured strip. The limit is fixed here, not
/// client-controlled.
#[utoipa::path(
    get,
    path = "/api/products/featured",
    responses((status = 200, description = "Featured products", body = [Product]))
)]
pub async fn get_featured_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    match state.repo.get_featured_products(8).await {
        Ok(products) => Ok(Json(products)),
        Err(e) => {
            tracing::error!("get_featured_products error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// get_product_details
///
/// [Public Route] A single active product; inactive or unknown IDs are 404.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Found", body = Product),
        (status = 404, description = "Unknown or inactive product")
    )
)]
pub async fn get_product_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, StatusCode> {
    match state.repo.get_product(id).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("get_product error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// --- Vouchers ---

/// use_voucher
///
/// [Session Route] Redeems a voucher code, bumping its usage counter atomically.
///
/// This path is not under the interceptor's protected prefixes, so the session
/// requirement is enforced right here by the `SessionUser` extractor: no token
/// means the handler never runs and the caller gets 401. Any authenticated role
/// may redeem.
#[utoipa::path(
    post,
    path = "/api/vouchers/use",
    request_body = UseVoucherRequest,
    responses(
        (status = 200, description = "Voucher redeemed", body = Voucher),
        (status = 400, description = "Missing voucher code", body = ErrorMessage),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Unknown or inactive code")
    )
)]
pub async fn use_voucher(
    _session: SessionUser,
    State(state): State<AppState>,
    Json(payload): Json<UseVoucherRequest>,
) -> Result<Json<Voucher>, ApiError> {
    let code = payload.code.trim();
    if code.is_empty() {
        return Err(bad_request("voucher code is required"));
    }

    match state.repo.redeem_voucher(code).await {
        Ok(Some(voucher)) => Ok(Json(voucher)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorMessage::new("unknown or inactive voucher code")),
        )),
        Err(e) => {
            tracing::error!("voucher redemption failed: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage::new("voucher redemption failed")),
            ))
        }
    }
}

// --- Seller Area (behind the interceptor) ---

/// get_seller_products
///
/// [Seller Route] The seller's own products, including inactive ones. The
/// interceptor has already established a SELLER session; the session is still
/// used here to scope the query to the owner.
#[utoipa::path(
    get,
    path = "/seller/products",
    responses((status = 200, description = "Seller's products", body = [Product]))
)]
pub async fn get_seller_products(
    SessionUser { id, .. }: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    match state.repo.get_seller_products(id).await {
        Ok(products) => Ok(Json(products)),
        Err(e) => {
            tracing::error!("get_seller_products error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// create_seller_product
///
/// [Seller Route] Adds a product owned by the requesting seller. The owner comes
/// from the session, never from the payload.
#[utoipa::path(
    post,
    path = "/seller/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "Missing fields", body = ErrorMessage)
    )
)]
pub async fn create_seller_product(
    SessionUser { id, .. }: SessionUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(bad_request("product name is required"));
    }
    if payload.price_cents < 0 {
        return Err(bad_request("price must not be negative"));
    }

    match state.repo.create_product(payload, id).await {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(e) => {
            tracing::error!("product insert failed: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage::new("could not create product")),
            ))
        }
    }
}

// --- Dashboard Area (behind the interceptor) ---

/// get_dashboard_stats
///
/// [Dashboard Route] Storefront counters for the seller dashboard.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    responses((status = 200, description = "Storefront counters", body = DashboardStats))
)]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, StatusCode> {
    match state.repo.get_dashboard_stats().await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            tracing::error!("get_dashboard_stats error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// get_dashboard_vouchers
///
/// [Dashboard Route] All vouchers with their usage counters.
#[utoipa::path(
    get,
    path = "/dashboard/vouchers",
    responses((status = 200, description = "Vouchers", body = [Voucher]))
)]
pub async fn get_dashboard_vouchers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Voucher>>, StatusCode> {
    match state.repo.list_vouchers().await {
        Ok(vouchers) => Ok(Json(vouchers)),
        Err(e) => {
            tracing::error!("list_vouchers error: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
