//! Error taxonomy for the auth core.
//!
//! Every failure that can occur while handling a request maps to exactly one
//! of these kinds before reaching the response boundary: authentication
//! failures to 401, authorization failures to 403, malformed issuance input
//! to 400. `ConfigError` is the exception: it can only happen at startup and
//! halts the process.

use thiserror::Error;

use crate::permissions::PermissionName;

/// Fatal startup/configuration error. Never produced at request time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing key is not configured")]
    MissingSigningKey,

    #[error("invalid key material for kid '{kid}': {reason}")]
    InvalidKeyMaterial { kid: String, reason: String },

    /// Only EdDSA is accepted; key material is Ed25519.
    #[error("unsupported signature algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid_key(kid: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidKeyMaterial {
            kid: kid.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_value(key: &'static str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.to_string(),
        }
    }
}

/// Internal reason an authentication attempt was rejected.
///
/// Subtypes are distinguishable for tests and logs. Callers at the response
/// boundary must collapse them: every subtype maps to the same 401 and the
/// external body never reveals which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationFailure {
    /// No bearer token on a protected operation.
    MissingToken,
    /// The token could not be parsed into header/payload/signature, or the
    /// payload did not decode into the expected claims shape.
    Malformed,
    /// The header's declared algorithm differs from the configured one.
    AlgorithmMismatch,
    /// The header's key id does not resolve to a known verification key.
    UnknownKey,
    /// Signature verification against the resolved key failed.
    BadSignature,
    /// `expiration + skew <= now`.
    Expired,
    /// `issued-at - skew > now`.
    NotYetValid,
    IssuerMismatch,
    AudienceMismatch,
}

impl AuthenticationFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationFailure::MissingToken => "missing_token",
            AuthenticationFailure::Malformed => "malformed",
            AuthenticationFailure::AlgorithmMismatch => "algorithm_mismatch",
            AuthenticationFailure::UnknownKey => "unknown_key",
            AuthenticationFailure::BadSignature => "bad_signature",
            AuthenticationFailure::Expired => "expired",
            AuthenticationFailure::NotYetValid => "not_yet_valid",
            AuthenticationFailure::IssuerMismatch => "issuer_mismatch",
            AuthenticationFailure::AudienceMismatch => "audience_mismatch",
        }
    }
}

impl core::fmt::Display for AuthenticationFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication failed; maps to HTTP 401 at the boundary.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("authentication failed: {failure}")]
pub struct AuthenticationError {
    failure: AuthenticationFailure,
}

impl AuthenticationError {
    pub fn new(failure: AuthenticationFailure) -> Self {
        Self { failure }
    }

    /// The internal subtype, for diagnostics only.
    pub fn failure(&self) -> AuthenticationFailure {
        self.failure
    }
}

impl From<AuthenticationFailure> for AuthenticationError {
    fn from(failure: AuthenticationFailure) -> Self {
        Self::new(failure)
    }
}

/// The token was valid but lacked required permissions; maps to HTTP 403.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing required permissions: {}", format_permissions(.missing))]
pub struct AuthorizationError {
    pub missing: Vec<PermissionName>,
}

fn format_permissions(permissions: &[PermissionName]) -> String {
    permissions
        .iter()
        .map(PermissionName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Malformed issuance or login input; maps to HTTP 400.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("validation failed: {0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Token issuance failure.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Signing failed. The key manager guarantees a usable signing key, so
    /// this indicates a serialization problem, not missing configuration.
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Guard decision error, carrying what the response boundary needs for
/// status mapping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Missing or invalid token; maps to 401.
    #[error(transparent)]
    Unauthenticated(#[from] AuthenticationError),

    /// Authenticated but insufficient permissions; maps to 403.
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_error_display_carries_subtype_for_logs() {
        let err = AuthenticationError::new(AuthenticationFailure::BadSignature);
        assert_eq!(err.to_string(), "authentication failed: bad_signature");
        assert_eq!(err.failure(), AuthenticationFailure::BadSignature);
    }

    #[test]
    fn authorization_error_lists_missing_permissions() {
        let err = AuthorizationError {
            missing: vec![
                PermissionName::new("roles.read"),
                PermissionName::new("roles.update"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "missing required permissions: roles.read, roles.update"
        );
    }
}
