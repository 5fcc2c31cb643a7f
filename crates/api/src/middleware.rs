use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use gatekeeper_auth::{AccessGrant, TokenVerifier, authorize};

use crate::app::errors;
use crate::authz::RoutePolicies;
use crate::context::RequestIdentity;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
    pub policies: Arc<RoutePolicies>,
}

/// One guard invocation per request: resolve the path's policy, extract the
/// bearer token, and let the guard decide. Verified claims are placed in
/// request extensions for handlers.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let policy = state.policies.for_path(req.uri().path());
    let bearer = bearer_token(req.headers());

    match authorize(&state.verifier, bearer, &policy, Utc::now()) {
        Ok(AccessGrant::Public) => Ok(next.run(req).await),
        Ok(AccessGrant::Authenticated(claims)) => {
            req.extensions_mut().insert(RequestIdentity::new(claims));
            Ok(next.run(req).await)
        }
        Err(err) => Err(errors::access_error_to_response(&err)),
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// A missing header, a different scheme, or an empty token all count as "no
/// token present".
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
