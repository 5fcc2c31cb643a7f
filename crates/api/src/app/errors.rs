use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gatekeeper_auth::{AccessError, IssueError};

/// Map a guard denial onto the wire.
///
/// Every authentication failure shares one status and one body; the internal
/// subtype goes to logs only. Authorization failures may name the missing
/// permissions, since the caller already proved who they are.
pub fn access_error_to_response(err: &AccessError) -> axum::response::Response {
    match err {
        AccessError::Unauthenticated(auth) => {
            tracing::debug!(failure = auth.failure().as_str(), "request unauthenticated");
            json_error(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "authentication failed",
            )
        }
        AccessError::Unauthorized(authz) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", authz.to_string())
        }
    }
}

pub fn issue_error_to_response(err: IssueError) -> axum::response::Response {
    match err {
        IssueError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        IssueError::Signing(e) => {
            tracing::error!(error = %e, "token signing failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "token issuance failed",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
