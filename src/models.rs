use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical account record from the `users` table. The password hash is carried
/// internally for login verification but is never serialized: every handler that
/// returns a `User` returns it minus the credential by construction.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    #[schema(ignore)]
    pub password_hash: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Internal insertion payload for the repository, produced by the registration
/// handler after validation and hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Category
///
/// A catalog category (rings, necklaces, earrings, ...). Public readers only
/// return active rows, ordered by `sort_order`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Material
///
/// A jewelry material (gold, silver, platinum, ...). Same visibility and ordering
/// rules as `Category`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Product
///
/// A catalog item from the `products` table. `is_active` controls public
/// visibility; `is_featured` feeds the storefront's featured strip.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Product {
    pub id: Uuid,
    // FK to users.id (the owning seller).
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    // Price in the smallest currency unit; no floats in money fields.
    pub price_cents: i64,
    pub category_id: Uuid,
    pub material_id: Uuid,
    pub is_featured: bool,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Voucher
///
/// A discount voucher. `used_count` is only ever changed through the atomic
/// increment in the repository.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Voucher {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i32,
    pub is_active: bool,
    pub used_count: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input for `POST /api/register`. All three fields are required. Absent fields
/// deserialize as blank instead of failing in the extractor, so the handler's
/// validation owns the rejection (400, with a message) for missing and blank
/// values alike.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// LoginRequest
///
/// Input for `POST /api/auth/login`. The identifier may be a username or an
/// email address.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// LoginResponse
///
/// Output of a successful login: the signed session token plus the account it
/// belongs to.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// UseVoucherRequest
///
/// Input for `POST /api/vouchers/use`. An absent code deserializes as blank and
/// is rejected by the handler, same as an explicit empty string.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct UseVoucherRequest {
    pub code: String,
}

/// CreateProductRequest
///
/// Input for `POST /seller/products`. The seller is taken from the session, never
/// from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: Uuid,
    pub material_id: Uuid,
    #[serde(default)]
    pub is_featured: bool,
}

// --- Dashboard Schemas (Output) ---

/// DashboardStats
///
/// Storefront counters for the seller dashboard (`GET /dashboard/stats`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, FromRow)]
#[ts(export)]
pub struct DashboardStats {
    pub total_products: i64,
    pub active_products: i64,
    pub total_vouchers: i64,
    /// Sum of `used_count` across all vouchers.
    pub voucher_redemptions: i64,
}

/// ErrorMessage
///
/// Body of every client-error response that carries a description (validation
/// failures, conflicts). Storage failures return a bare 500 with no internal
/// detail.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorMessage {
    pub error: String,
}

impl ErrorMessage {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
