/// Router Module Index
///
/// Routing is segregated by access level, mirroring the path classification the
/// authorization policy works with:
///
/// - `auth` is the auth infrastructure (`/api/auth/*`), never gated.
/// - `public` is the open storefront surface (catalog, registration, vouchers).
/// - `seller` and `dashboard` are the protected areas; the request interceptor is
///   layered over both in `create_router`.

/// Authentication endpoints (`/api/auth`): login and session introspection.
pub mod auth;

/// Anonymous storefront routes: catalog reads, registration, voucher use.
pub mod public;

/// Seller product management, mounted under `/seller`.
pub mod seller;

/// Seller dashboard views, mounted under `/dashboard`.
pub mod dashboard;
