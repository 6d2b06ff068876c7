use crate::auth::{Role, SessionUser};

// --- Route-matching configuration (fixed at deploy time) ---

/// Prefix for the authentication endpoints themselves (login, session).
/// Requests under this prefix must never be gated, or logging in would be impossible.
pub const AUTH_API_PREFIX: &str = "/api/auth";

/// Areas that require an authenticated SELLER session.
pub const PROTECTED_PREFIXES: [&str; 2] = ["/dashboard", "/seller"];

/// Where denied requests are sent.
pub const DENY_REDIRECT_TARGET: &str = "/";

/// PathClass
///
/// Every request path falls into exactly one of these categories. The classification
/// is a pure function of the path string; no request state is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Auth endpoints (`/api/auth/...`). Always allowed, checked before anything else.
    AuthInfrastructure,
    /// The seller-facing areas (`/dashboard`, `/seller`). Require a SELLER session.
    Protected,
    /// Everything else: storefront pages, catalog APIs, registration.
    Public,
}

/// DenyCause
///
/// Why a protected request was denied. Both causes produce the same redirect, but
/// the distinction is kept for audit logging in the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyCause {
    /// No session was attached to the request at all.
    MissingSession,
    /// A session was present, but its role does not grant access to seller areas.
    RoleNotPermitted(Role),
}

/// Decision
///
/// The outcome of evaluating the authorization policy for one request.
/// All call sites (the interceptor and the boolean predicate) go through
/// [`evaluate`]; there is deliberately no second place where the role check lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request unmodified.
    Allow,
    /// Short-circuit with an HTTP redirect to `target`.
    DenyRedirect {
        target: &'static str,
        cause: DenyCause,
    },
}

/// classify
///
/// Maps a request path to its [`PathClass`]. Total over all strings.
///
/// Prefix matching is segment-aware: `/dashboard` and `/dashboard/orders` are
/// protected, `/dashboardfoo` is not. The auth prefix is checked first so the
/// login endpoints can never be gated, even if the protected prefixes were ever
/// reconfigured to overlap them.
pub fn classify(path: &str) -> PathClass {
    if matches_prefix(path, AUTH_API_PREFIX) {
        return PathClass::AuthInfrastructure;
    }
    if PROTECTED_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        return PathClass::Protected;
    }
    PathClass::Public
}

/// Matches `prefix` exactly or `prefix` followed by a path separator.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// evaluate
///
/// The single authorization decision function: `(PathClass, session) -> Decision`.
///
/// - `AuthInfrastructure` and `Public` are always allowed. The `Public` arm is
///   defense-in-depth: the interceptor is only mounted on the protected routers,
///   so public paths normally never reach this function. Keeping the arm means the
///   policy stays correct if the middleware mounting ever widens.
/// - `Protected` is allowed only for an authenticated SELLER session. Absence of a
///   session and presence with the wrong role are distinct causes of the same
///   redirect.
///
/// Pure and deterministic: re-evaluating the same pair always yields the same
/// decision.
pub fn evaluate(class: PathClass, session: Option<&SessionUser>) -> Decision {
    match class {
        PathClass::AuthInfrastructure | PathClass::Public => Decision::Allow,
        PathClass::Protected => match session {
            Some(user) if user.role == Role::Seller => Decision::Allow,
            Some(user) => Decision::DenyRedirect {
                target: DENY_REDIRECT_TARGET,
                cause: DenyCause::RoleNotPermitted(user.role),
            },
            None => Decision::DenyRedirect {
                target: DENY_REDIRECT_TARGET,
                cause: DenyCause::MissingSession,
            },
        },
    }
}

/// is_authorized
///
/// Boolean view of the policy, derived from [`evaluate`] rather than re-implementing
/// the role check. Useful where a caller only needs a yes/no answer.
pub fn is_authorized(path: &str, session: Option<&SessionUser>) -> bool {
    matches!(evaluate(classify(path), session), Decision::Allow)
}
