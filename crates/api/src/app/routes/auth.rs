//! Authentication endpoints: login, JWKS, current identity.

use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::SecondsFormat;

use gatekeeper_auth::{IssueRequest, Jwks, snapshot_permissions, verify_password};

use crate::app::dto::{LoginRequest, TokenResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::RequestIdentity;

/// POST /api/v1/auth/login — authenticate and issue a token.
///
/// Public. Unknown email and wrong password are indistinguishable to the
/// caller; both are a plain 401.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(request): Json<LoginRequest>,
) -> axum::response::Response {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || request.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "email and password are required",
        );
    }

    let Some(account) = services.directory.find_by_email(&email) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        );
    };
    if !verify_password(&request.password, &account.password_hash) {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        );
    }

    // The role's permissions are flattened here, once; the token carries
    // this snapshot for its whole lifetime.
    let issue = IssueRequest {
        subject: account.id,
        organization_id: account.organization_id,
        roles: vec![account.role.name.clone()],
        permissions: snapshot_permissions(&account.role),
        ttl: None,
    };

    match services.issuer.issue(issue) {
        Ok(issued) => (StatusCode::OK, Json(TokenResponse::from_issued(issued))).into_response(),
        Err(err) => errors::issue_error_to_response(err),
    }
}

/// GET /api/v1/auth/jwks — public verification keys for external verifiers.
pub async fn jwks(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(Jwks::publish(&services.keys))
}

/// GET /api/v1/auth/me — the verified identity behind this request.
pub async fn me(Extension(identity): Extension<RequestIdentity>) -> impl IntoResponse {
    let claims = identity.claims();
    Json(serde_json::json!({
        "sub": claims.sub.to_string(),
        "organizationId": claims.organization_id.map(|id| id.to_string()),
        "roles": claims.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": claims.permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        "expiresAt": claims
            .expires_at()
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}
