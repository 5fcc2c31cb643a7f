use axum::{
    Router,
    routing::{get, post},
};

pub mod accounts;
pub mod auth;
pub mod rbac;
pub mod system;

/// Router for every operation. The auth middleware consults the route
/// policies to decide, per path, whether a token and which permissions are
/// required; handlers never re-check.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/api/v1/health", get(system::health))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/jwks", get(auth::jwks))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/accounts", get(accounts::list_accounts))
        .route("/api/v1/roles", get(rbac::list_roles))
}
