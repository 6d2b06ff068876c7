use crate::auth::Role;
use crate::models::{
    Category, CreateProductRequest, DashboardStats, Material, NewUser, Product, User, Voucher,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Abstract contract for all persistence operations, so handlers never depend on
/// the concrete storage engine. Errors are surfaced to the caller; the handler
/// boundary decides how they map to HTTP responses.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across
/// axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    /// Login lookup: matches either the username or the email address.
    async fn find_user_by_login(&self, identifier: &str) -> Result<Option<User>, sqlx::Error>;
    /// Conflict pre-check for registration: any existing row with this email OR username.
    async fn find_user_conflict(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;

    // --- Public catalog ---
    async fn get_categories(&self) -> Result<Vec<Category>, sqlx::Error>;
    async fn get_materials(&self) -> Result<Vec<Material>, sqlx::Error>;
    /// Active products only, optionally filtered by category/material/search text.
    async fn get_products(
        &self,
        category: Option<Uuid>,
        material: Option<Uuid>,
        search: Option<String>,
    ) -> Result<Vec<Product>, sqlx::Error>;
    async fn get_featured_products(&self, limit: i64) -> Result<Vec<Product>, sqlx::Error>;
    /// Single active product; inactive rows read as not found.
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, sqlx::Error>;

    // --- Seller area ---
    /// All products owned by the seller, including inactive ones.
    async fn get_seller_products(&self, seller_id: Uuid) -> Result<Vec<Product>, sqlx::Error>;
    async fn create_product(
        &self,
        req: CreateProductRequest,
        seller_id: Uuid,
    ) -> Result<Product, sqlx::Error>;

    // --- Vouchers & dashboard ---
    /// Atomically increments `used_count` for an active voucher and returns the
    /// updated row; `None` if the code is unknown or inactive.
    async fn redeem_voucher(&self, code: &str) -> Result<Option<Voucher>, sqlx::Error>;
    async fn list_vouchers(&self) -> Result<Vec<Voucher>, sqlx::Error>;
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer through the app state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` implementation backed by PostgreSQL. Uses sqlx's runtime query
/// APIs throughout; the crate builds without a database connection.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw `users` row. The role column is TEXT in the database and is parsed into
/// the closed `Role` enum here, at the storage boundary, so the rest of the code
/// never sees a free-form role string.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, sqlx::Error> {
        let role = Role::from_str(&self.role).map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: e.into(),
        })?;
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

const PRODUCT_COLUMNS: &str = "id, seller_id, name, description, price_cents, category_id, \
     material_id, is_featured, is_active, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_login(&self, identifier: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_conflict(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $2"
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, username, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        row.into_user()
    }

    async fn get_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, sort_order, is_active FROM categories \
             WHERE is_active = true ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_materials(&self) -> Result<Vec<Material>, sqlx::Error> {
        sqlx::query_as::<_, Material>(
            "SELECT id, name, slug, sort_order, is_active FROM materials \
             WHERE is_active = true ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Filtered listing built with `QueryBuilder` so every user-supplied value is
    /// a bound parameter. `is_active = true` is part of the base query and cannot
    /// be filtered away.
    async fn get_products(
        &self,
        category: Option<Uuid>,
        material: Option<Uuid>,
        search: Option<String>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = true"
        ));

        if let Some(c) = category {
            builder.push(" AND category_id = ");
            builder.push_bind(c);
        }

        if let Some(m) = material {
            builder.push(" AND material_id = ");
            builder.push_bind(m);
        }

        if let Some(s) = search {
            let pattern = format!("%{}%", s);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
    }

    async fn get_featured_products(&self, limit: i64) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = true AND is_featured = true \
             ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_seller_products(&self, seller_id: Uuid) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_product(
        &self,
        req: CreateProductRequest,
        seller_id: Uuid,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products \
             (id, seller_id, name, description, price_cents, category_id, material_id, \
              is_featured, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, NOW(), NOW()) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.price_cents)
        .bind(req.category_id)
        .bind(req.material_id)
        .bind(req.is_featured)
        .fetch_one(&self.pool)
        .await
    }

    /// The increment happens in a single UPDATE, so concurrent redemptions of the
    /// same code cannot lose a count.
    async fn redeem_voucher(&self, code: &str) -> Result<Option<Voucher>, sqlx::Error> {
        sqlx::query_as::<_, Voucher>(
            "UPDATE vouchers SET used_count = used_count + 1 \
             WHERE code = $1 AND is_active = true \
             RETURNING id, code, discount_percent, is_active, used_count, created_at",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_vouchers(&self) -> Result<Vec<Voucher>, sqlx::Error> {
        sqlx::query_as::<_, Voucher>(
            "SELECT id, code, discount_percent, is_active, used_count, created_at \
             FROM vouchers ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        let active_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = true")
                .fetch_one(&self.pool)
                .await?;
        let total_vouchers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vouchers")
            .fetch_one(&self.pool)
            .await?;
        let voucher_redemptions: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(used_count), 0)::BIGINT FROM vouchers")
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardStats {
            total_products,
            active_products,
            total_vouchers,
            voucher_redemptions,
        })
    }
}
