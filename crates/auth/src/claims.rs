//! Token claims model and deterministic claim validation.

use core::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::{AccountId, OrganizationId};
use crate::error::{AuthenticationError, AuthenticationFailure};
use crate::permissions::PermissionName;
use crate::roles::RoleName;

/// Unique token identifier (`jti`). UUIDv7, so ids sort by issuance time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TokenId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TokenId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Signed token payload.
///
/// The shape is fixed: a token whose payload is missing any non-optional
/// field fails to decode and is rejected as malformed. `permissions` is the
/// point-in-time snapshot taken at issuance; it is never re-derived from
/// role state during verification, so revoking a permission only takes
/// effect once outstanding tokens expire.
///
/// Claims are created once, at issuance, and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated account.
    pub sub: AccountId,

    #[serde(
        rename = "organizationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<OrganizationId>,

    pub iss: String,

    pub aud: String,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,

    pub jti: TokenId,

    pub roles: Vec<RoleName>,

    pub permissions: Vec<PermissionName>,
}

impl Claims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn has_permission(&self, permission: &PermissionName) -> bool {
        self.permissions.contains(permission)
    }
}

/// Deterministically validate decoded claims against expectations.
///
/// Signature verification happens before this is called; these checks cover
/// the time window (with skew tolerance) and the issuer/audience binding.
/// The order matches the verification pipeline: expiration, then not-yet-
/// valid, then issuer, then audience.
pub fn validate_claims(
    claims: &Claims,
    expected_issuer: &str,
    expected_audience: &str,
    now: DateTime<Utc>,
    skew: Duration,
) -> Result<(), AuthenticationError> {
    let now = now.timestamp();
    let skew = skew.as_secs() as i64;

    if claims.exp + skew <= now {
        return Err(AuthenticationFailure::Expired.into());
    }
    if claims.iat - skew > now {
        return Err(AuthenticationFailure::NotYetValid.into());
    }
    if claims.iss != expected_issuer {
        return Err(AuthenticationFailure::IssuerMismatch.into());
    }
    if claims.aud != expected_audience {
        return Err(AuthenticationFailure::AudienceMismatch.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(iat: i64, exp: i64) -> Claims {
        Claims {
            sub: AccountId::new(),
            organization_id: None,
            iss: "https://api.example.com".to_owned(),
            aud: "https://api.example.com".to_owned(),
            iat,
            exp,
            jti: TokenId::new(),
            roles: vec![RoleName::new("Admin")],
            permissions: vec![PermissionName::new("accounts.read")],
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    const ISS: &str = "https://api.example.com";
    const NO_SKEW: Duration = Duration::from_secs(0);

    #[test]
    fn valid_within_window() {
        let claims = claims_at(1_000, 2_000);
        assert!(validate_claims(&claims, ISS, ISS, at(1_500), NO_SKEW).is_ok());
    }

    #[test]
    fn expired_at_and_after_expiration() {
        let claims = claims_at(1_000, 2_000);
        let err = validate_claims(&claims, ISS, ISS, at(2_000), NO_SKEW).unwrap_err();
        assert_eq!(err.failure(), AuthenticationFailure::Expired);

        // Skew widens the window.
        let skew = Duration::from_secs(30);
        assert!(validate_claims(&claims, ISS, ISS, at(2_000), skew).is_ok());
        let err = validate_claims(&claims, ISS, ISS, at(2_030), skew).unwrap_err();
        assert_eq!(err.failure(), AuthenticationFailure::Expired);
    }

    #[test]
    fn not_yet_valid_before_issued_at() {
        let claims = claims_at(1_000, 2_000);
        let err = validate_claims(&claims, ISS, ISS, at(900), NO_SKEW).unwrap_err();
        assert_eq!(err.failure(), AuthenticationFailure::NotYetValid);

        let skew = Duration::from_secs(150);
        assert!(validate_claims(&claims, ISS, ISS, at(900), skew).is_ok());
    }

    #[test]
    fn issuer_and_audience_must_match() {
        let claims = claims_at(1_000, 2_000);
        let err = validate_claims(&claims, "https://other", ISS, at(1_500), NO_SKEW).unwrap_err();
        assert_eq!(err.failure(), AuthenticationFailure::IssuerMismatch);

        let err = validate_claims(&claims, ISS, "https://other", at(1_500), NO_SKEW).unwrap_err();
        assert_eq!(err.failure(), AuthenticationFailure::AudienceMismatch);
    }

    #[test]
    fn serde_shape_is_stable() {
        let mut claims = claims_at(1_000, 2_000);
        claims.organization_id = Some(OrganizationId::new());

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("organizationId").is_some());
        assert!(json.get("organization_id").is_none());

        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn organization_id_is_optional_and_omitted_when_absent() {
        let claims = claims_at(1_000, 2_000);
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("organizationId").is_none());

        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back.organization_id, None);
    }

    #[test]
    fn payload_missing_required_field_is_rejected() {
        let mut json = serde_json::to_value(claims_at(1_000, 2_000)).unwrap();
        json.as_object_mut().unwrap().remove("jti");
        assert!(serde_json::from_value::<Claims>(json).is_err());
    }

    #[test]
    fn empty_role_and_permission_arrays_round_trip() {
        let mut claims = claims_at(1_000, 2_000);
        claims.roles = Vec::new();
        claims.permissions = Vec::new();

        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
        assert!(back.roles.is_empty());
        assert!(back.permissions.is_empty());
    }
}
