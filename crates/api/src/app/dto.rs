//! Request/response DTOs and JSON mapping helpers.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use gatekeeper_auth::{AccountRecord, IssuedToken, PermissionName, RoleRecord};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Minimal token response: everything else is inside the token itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token_type: &'static str,
    pub token: String,
    /// ISO 8601 expiration timestamp.
    pub expires_at: String,
}

impl TokenResponse {
    pub fn from_issued(issued: IssuedToken) -> Self {
        Self {
            token_type: "Bearer",
            token: issued.token,
            expires_at: issued.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl From<&AccountRecord> for AccountSummary {
    fn from(account: &AccountRecord) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.clone(),
            role: account.role.name.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
}

impl From<&RoleRecord> for RoleSummary {
    fn from(role: &RoleRecord) -> Self {
        Self {
            id: role.id.to_string(),
            name: role.name.as_str().to_owned(),
            permissions: role
                .permissions
                .iter()
                .map(PermissionName::as_str)
                .map(str::to_owned)
                .collect(),
        }
    }
}
