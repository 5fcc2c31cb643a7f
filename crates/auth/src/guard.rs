//! Per-request authorization decisions.
//!
//! The guard is pure given its inputs: no I/O, no shared mutable state. The
//! full decision table (public/protected x token present/absent/invalid x
//! permission subset) is therefore unit-testable without any transport.

use chrono::{DateTime, Utc};

use crate::claims::Claims;
use crate::error::{AccessError, AuthenticationError, AuthenticationFailure, AuthorizationError};
use crate::permissions::PermissionName;
use crate::verifier::TokenVerifier;

/// Access policy for a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPolicy {
    /// Public operations skip authentication entirely; the token, if any,
    /// is never parsed.
    pub public: bool,
    /// Permissions that must ALL be present in the token's snapshot.
    pub required: Vec<PermissionName>,
}

impl OperationPolicy {
    /// Policy for a public operation.
    pub fn public_operation() -> Self {
        Self {
            public: true,
            required: Vec::new(),
        }
    }

    /// Policy requiring a valid token but no particular permission.
    pub fn authenticated() -> Self {
        Self {
            public: false,
            required: Vec::new(),
        }
    }

    /// Policy requiring a valid token carrying every listed permission.
    pub fn requiring(required: Vec<PermissionName>) -> Self {
        Self {
            public: false,
            required,
        }
    }
}

/// Successful outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGrant {
    /// Public operation; no token was parsed.
    Public,
    /// Verified token with sufficient permissions. The claims stay available
    /// to the caller for the remainder of request handling.
    Authenticated(Claims),
}

impl AccessGrant {
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            AccessGrant::Public => None,
            AccessGrant::Authenticated(claims) => Some(claims),
        }
    }
}

/// Decide whether a request may proceed.
///
/// - Public operation: allowed unconditionally, token untouched.
/// - No token on a protected operation: `Unauthenticated` (401).
/// - Verifier rejection: `Unauthenticated` (401), internal subtype kept for
///   diagnostics only.
/// - Missing any required permission: `Unauthorized` (403). The check is a
///   subset test over the whole required set, not any-of.
pub fn authorize(
    verifier: &TokenVerifier,
    bearer: Option<&str>,
    policy: &OperationPolicy,
    now: DateTime<Utc>,
) -> Result<AccessGrant, AccessError> {
    if policy.public {
        return Ok(AccessGrant::Public);
    }

    let token = bearer
        .ok_or_else(|| AuthenticationError::new(AuthenticationFailure::MissingToken))?;
    let claims = verifier.verify(token, now)?;

    let missing: Vec<PermissionName> = policy
        .required
        .iter()
        .filter(|permission| !claims.permissions.contains(permission))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(AuthorizationError { missing }.into());
    }

    Ok(AccessGrant::Authenticated(claims))
}
