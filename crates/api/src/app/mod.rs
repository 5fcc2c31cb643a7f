//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: account directory and issuer wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: status mapping and consistent error bodies

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use gatekeeper_auth::{AuthConfig, KeyManager, TokenIssuer, TokenVerifier};

use crate::authz::RoutePolicies;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{AccountDirectory, AppServices};

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(
    config: AuthConfig,
    keys: Arc<KeyManager>,
    directory: Arc<dyn AccountDirectory>,
) -> Router {
    let verifier = Arc::new(TokenVerifier::from_config(&config, keys.clone()));
    let issuer = TokenIssuer::from_config(&config, keys.clone());
    let policies = Arc::new(RoutePolicies::from_config(&config));

    let services = Arc::new(AppServices {
        issuer,
        keys,
        directory,
    });
    let auth_state = middleware::AuthState { verifier, policies };

    routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(ServiceBuilder::new())
}
