//! Token issuance.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::Header;

use crate::account::{AccountId, OrganizationId};
use crate::claims::{Claims, TokenId};
use crate::config::AuthConfig;
use crate::error::{IssueError, ValidationError};
use crate::keys::KeyManager;
use crate::permissions::PermissionName;
use crate::roles::RoleName;

/// Everything the issuer embeds besides timestamps and the fresh `jti`.
///
/// `permissions` arrives already flattened (see
/// [`crate::snapshot::snapshot_permissions`]); the issuer copies it verbatim.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub subject: AccountId,
    pub organization_id: Option<OrganizationId>,
    pub roles: Vec<RoleName>,
    pub permissions: Vec<PermissionName>,
    /// Overrides the issuer's default time-to-live when set.
    pub ttl: Option<Duration>,
}

/// A freshly signed compact token plus its computed expiration.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The exact claims that were signed, for callers that need them without
    /// re-decoding the token.
    pub claims: Claims,
}

/// Builds and signs tokens. Stateless per call; the only shared resource is
/// the read-only key manager.
pub struct TokenIssuer {
    issuer: String,
    audience: String,
    default_ttl: Duration,
    keys: Arc<KeyManager>,
}

impl TokenIssuer {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        default_ttl: Duration,
        keys: Arc<KeyManager>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            default_ttl,
            keys,
        }
    }

    pub fn from_config(config: &AuthConfig, keys: Arc<KeyManager>) -> Self {
        Self::new(
            config.issuer.clone(),
            config.audience.clone(),
            config.token_ttl,
            keys,
        )
    }

    /// Sign a token for `request`, stamping `iat` with the current time.
    pub fn issue(&self, request: IssueRequest) -> Result<IssuedToken, IssueError> {
        self.issue_at(request, Utc::now())
    }

    /// Like [`TokenIssuer::issue`] with an explicit clock, so expiration
    /// behavior is testable without sleeping.
    pub fn issue_at(
        &self,
        request: IssueRequest,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, IssueError> {
        let ttl = request.ttl.unwrap_or(self.default_ttl);
        if ttl.as_secs() == 0 {
            return Err(ValidationError::new("token ttl must be at least one second").into());
        }

        let iat = now.timestamp();
        let claims = Claims {
            sub: request.subject,
            organization_id: request.organization_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp: iat + ttl.as_secs() as i64,
            jti: TokenId::new(),
            roles: request.roles,
            permissions: request.permissions,
        };

        let signing = self.keys.signing_key();
        let mut header = Header::new(self.keys.algorithm());
        header.kid = Some(signing.kid().to_owned());
        let token = jsonwebtoken::encode(&header, &claims, signing.encoding())?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueError;

    fn issuer() -> TokenIssuer {
        let keys = Arc::new(KeyManager::generate("auth-test").expect("generate keys"));
        TokenIssuer::new(
            "https://api.example.com",
            "https://api.example.com",
            Duration::from_secs(3600),
            keys,
        )
    }

    fn request() -> IssueRequest {
        IssueRequest {
            subject: AccountId::new(),
            organization_id: Some(OrganizationId::new()),
            roles: vec![RoleName::new("Admin")],
            permissions: vec![
                PermissionName::new("accounts.read"),
                PermissionName::new("roles.read"),
            ],
            ttl: None,
        }
    }

    #[test]
    fn issues_three_segment_compact_token() {
        let issued = issuer().issue(request()).expect("issue");
        assert_eq!(issued.token.split('.').count(), 3);
    }

    #[test]
    fn claims_carry_request_values_and_window() {
        let req = request();
        let subject = req.subject;
        let now = Utc::now();
        let issued = issuer().issue_at(req, now).expect("issue");

        assert_eq!(issued.claims.sub, subject);
        assert_eq!(issued.claims.iss, "https://api.example.com");
        assert_eq!(issued.claims.iat, now.timestamp());
        assert_eq!(issued.claims.exp, now.timestamp() + 3600);
        assert_eq!(issued.expires_at, issued.claims.expires_at());
    }

    #[test]
    fn ttl_override_wins_over_default() {
        let mut req = request();
        req.ttl = Some(Duration::from_secs(60));
        let now = Utc::now();
        let issued = issuer().issue_at(req, now).expect("issue");
        assert_eq!(issued.claims.exp - issued.claims.iat, 60);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut req = request();
        req.ttl = Some(Duration::from_secs(0));
        let err = issuer().issue(req).expect_err("zero ttl");
        assert!(matches!(err, IssueError::Validation(_)));
    }

    #[test]
    fn each_token_gets_a_fresh_jti() {
        let issuer = issuer();
        let a = issuer.issue(request()).expect("issue");
        let b = issuer.issue(request()).expect("issue");
        assert_ne!(a.claims.jti, b.claims.jti);
    }
}
