//! Token verification.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};

use crate::claims::{Claims, validate_claims};
use crate::config::AuthConfig;
use crate::error::{AuthenticationError, AuthenticationFailure};
use crate::keys::KeyManager;

/// Parses, validates, and decodes compact tokens into [`Claims`].
///
/// The accepted algorithm is pinned at construction. A token header's `alg`
/// is compared against it but never used to select the verification method,
/// so an attacker cannot downgrade or substitute the algorithm.
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    algorithm: Algorithm,
    clock_skew: Duration,
    keys: Arc<KeyManager>,
}

impl TokenVerifier {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithm: Algorithm,
        clock_skew: Duration,
        keys: Arc<KeyManager>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm,
            clock_skew,
            keys,
        }
    }

    pub fn from_config(config: &AuthConfig, keys: Arc<KeyManager>) -> Self {
        Self::new(
            config.issuer.clone(),
            config.audience.clone(),
            config.algorithm,
            config.clock_skew,
            keys,
        )
    }

    /// Verify `token` against the caller's clock and decode its claims.
    ///
    /// Pipeline: parse header, pin algorithm, resolve kid, verify signature,
    /// decode the fixed claims shape, then temporal and issuer/audience
    /// checks. The first failing step determines the internal subtype; all
    /// of them surface as one `AuthenticationError` at the boundary.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthenticationError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| self.reject(AuthenticationFailure::Malformed))?;

        if header.alg != self.algorithm {
            return Err(self.reject(AuthenticationFailure::AlgorithmMismatch));
        }

        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| self.reject(AuthenticationFailure::UnknownKey))?;
        let key = self
            .keys
            .verification_key(kid)
            .ok_or_else(|| self.reject(AuthenticationFailure::UnknownKey))?;

        // Temporal and issuer/audience checks run below against the caller's
        // clock; jsonwebtoken only checks the signature and payload shape.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let decoded = jsonwebtoken::decode::<Claims>(token, key.decoding(), &validation).map_err(
            |err| match err.kind() {
                ErrorKind::InvalidSignature => self.reject(AuthenticationFailure::BadSignature),
                _ => self.reject(AuthenticationFailure::Malformed),
            },
        )?;

        validate_claims(
            &decoded.claims,
            &self.issuer,
            &self.audience,
            now,
            self.clock_skew,
        )
        .map_err(|err| self.reject(err.failure()))?;

        Ok(decoded.claims)
    }

    fn reject(&self, failure: AuthenticationFailure) -> AuthenticationError {
        tracing::debug!(failure = failure.as_str(), "token rejected");
        AuthenticationError::new(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use crate::claims::TokenId;
    use crate::issuer::{IssueRequest, TokenIssuer};
    use crate::permissions::PermissionName;
    use crate::roles::RoleName;

    use proptest::prelude::*;

    const ISS: &str = "https://api.example.com";

    fn keys() -> Arc<KeyManager> {
        Arc::new(KeyManager::generate("auth-test").expect("generate keys"))
    }

    fn issuer_with(keys: Arc<KeyManager>, ttl: Duration) -> TokenIssuer {
        TokenIssuer::new(ISS, ISS, ttl, keys)
    }

    fn verifier_with(keys: Arc<KeyManager>, skew: Duration) -> TokenVerifier {
        TokenVerifier::new(ISS, ISS, Algorithm::EdDSA, skew, keys)
    }

    fn request(permissions: &[&'static str]) -> IssueRequest {
        IssueRequest {
            subject: AccountId::new(),
            organization_id: None,
            roles: vec![RoleName::new("Admin")],
            permissions: permissions.iter().map(|p| PermissionName::new(*p)).collect(),
            ttl: None,
        }
    }

    fn failure_of(result: Result<Claims, AuthenticationError>) -> AuthenticationFailure {
        result.expect_err("expected rejection").failure()
    }

    #[test]
    fn round_trip_reproduces_claims_exactly() {
        let keys = keys();
        let issuer = issuer_with(keys.clone(), Duration::from_secs(3600));
        let verifier = verifier_with(keys, Duration::from_secs(0));

        let issued = issuer.issue(request(&["accounts.read"])).expect("issue");
        let claims = verifier.verify(&issued.token, Utc::now()).expect("verify");
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn empty_role_and_permission_arrays_survive_the_wire() {
        let keys = keys();
        let issuer = issuer_with(keys.clone(), Duration::from_secs(3600));
        let verifier = verifier_with(keys, Duration::from_secs(0));

        let mut req = request(&[]);
        req.roles = Vec::new();
        let issued = issuer.issue(req).expect("issue");
        let claims = verifier.verify(&issued.token, Utc::now()).expect("verify");
        assert!(claims.roles.is_empty());
        assert!(claims.permissions.is_empty());
    }

    #[test]
    fn short_lived_token_expires_on_schedule() {
        let keys = keys();
        let issuer = issuer_with(keys.clone(), Duration::from_secs(3600));
        let verifier = verifier_with(keys, Duration::from_secs(0));

        let now = Utc::now();
        let mut req = request(&["accounts.read"]);
        req.ttl = Some(Duration::from_secs(1));
        let issued = issuer.issue_at(req, now).expect("issue");

        // Valid immediately, expired two seconds later.
        assert!(verifier.verify(&issued.token, now).is_ok());
        let later = now + chrono::Duration::seconds(2);
        assert_eq!(
            failure_of(verifier.verify(&issued.token, later)),
            AuthenticationFailure::Expired
        );
    }

    #[test]
    fn skew_tolerance_delays_expiration() {
        let keys = keys();
        let issuer = issuer_with(keys.clone(), Duration::from_secs(3600));
        let verifier = verifier_with(keys, Duration::from_secs(30));

        let now = Utc::now();
        let mut req = request(&[]);
        req.ttl = Some(Duration::from_secs(1));
        let issued = issuer.issue_at(req, now).expect("issue");

        let within_skew = now + chrono::Duration::seconds(20);
        assert!(verifier.verify(&issued.token, within_skew).is_ok());

        let past_skew = now + chrono::Duration::seconds(40);
        assert_eq!(
            failure_of(verifier.verify(&issued.token, past_skew)),
            AuthenticationFailure::Expired
        );
    }

    #[test]
    fn token_issued_in_the_future_is_not_yet_valid() {
        let keys = keys();
        let issuer = issuer_with(keys.clone(), Duration::from_secs(3600));
        let verifier = verifier_with(keys, Duration::from_secs(0));

        let ahead = Utc::now() + chrono::Duration::seconds(120);
        let issued = issuer.issue_at(request(&[]), ahead).expect("issue");
        assert_eq!(
            failure_of(verifier.verify(&issued.token, Utc::now())),
            AuthenticationFailure::NotYetValid
        );
    }

    #[test]
    fn garbage_input_is_malformed() {
        let verifier = verifier_with(keys(), Duration::from_secs(0));
        for garbage in ["garbage", "a.b", "", "....", "not a token at all"] {
            assert_eq!(
                failure_of(verifier.verify(garbage, Utc::now())),
                AuthenticationFailure::Malformed,
                "input: {garbage:?}"
            );
        }
    }

    #[test]
    fn header_algorithm_is_never_trusted() {
        // A token signed with a shared secret declaring HS256 must be
        // rejected on the algorithm check, before any key is consulted.
        let keys = keys();
        let verifier = verifier_with(keys.clone(), Duration::from_secs(0));

        let claims = Claims {
            sub: AccountId::new(),
            organization_id: None,
            iss: ISS.to_owned(),
            aud: ISS.to_owned(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 600,
            jti: TokenId::new(),
            roles: Vec::new(),
            permissions: Vec::new(),
        };
        let mut header = jsonwebtoken::Header::new(Algorithm::HS256);
        header.kid = Some("auth-test".to_owned());
        let forged = jsonwebtoken::encode(
            &header,
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"guessable"),
        )
        .expect("encode");

        assert_eq!(
            failure_of(verifier.verify(&forged, Utc::now())),
            AuthenticationFailure::AlgorithmMismatch
        );
    }

    #[test]
    fn unknown_or_missing_kid_is_rejected() {
        let signing_keys = keys();
        let issuer = issuer_with(signing_keys.clone(), Duration::from_secs(3600));
        let issued = issuer.issue(request(&[])).expect("issue");

        // A verifier whose key set does not contain "auth-test".
        let other_keys = Arc::new(KeyManager::generate("auth-other").expect("generate keys"));
        let verifier = verifier_with(other_keys, Duration::from_secs(0));
        assert_eq!(
            failure_of(verifier.verify(&issued.token, Utc::now())),
            AuthenticationFailure::UnknownKey
        );

        // No kid in the header at all.
        let header = jsonwebtoken::Header::new(Algorithm::EdDSA);
        let no_kid = jsonwebtoken::encode(
            &header,
            &issued.claims,
            signing_keys.signing_key().encoding(),
        )
        .expect("encode");
        let verifier = verifier_with(signing_keys, Duration::from_secs(0));
        assert_eq!(
            failure_of(verifier.verify(&no_kid, Utc::now())),
            AuthenticationFailure::UnknownKey
        );
    }

    #[test]
    fn rotated_key_set_still_verifies_outstanding_tokens() {
        let old = keys();
        let issuer = issuer_with(old.clone(), Duration::from_secs(3600));
        let issued = issuer.issue(request(&["accounts.read"])).expect("issue");

        let rotated = Arc::new(old.rotate("auth-next").expect("rotate"));
        let verifier = verifier_with(rotated, Duration::from_secs(0));
        assert!(verifier.verify(&issued.token, Utc::now()).is_ok());
    }

    #[test]
    fn tampered_payload_or_signature_fails_signature_check() {
        let keys = keys();
        let issuer = issuer_with(keys.clone(), Duration::from_secs(3600));
        let verifier = verifier_with(keys, Duration::from_secs(0));
        let issued = issuer.issue(request(&["accounts.read"])).expect("issue");

        let segments: Vec<&str> = issued.token.split('.').collect();
        assert_eq!(segments.len(), 3);

        // Corrupt one base64url character in the payload, then in the
        // signature; every such change must fail signature verification.
        for segment_index in [1usize, 2] {
            let mut parts: Vec<String> =
                segments.iter().map(|s| (*s).to_owned()).collect();
            let target = &mut parts[segment_index];
            let original = target.as_bytes()[0];
            let replacement = if original == b'A' { b'B' } else { b'A' };
            let mut bytes = target.clone().into_bytes();
            bytes[0] = replacement;
            *target = String::from_utf8(bytes).expect("ascii");

            let tampered = parts.join(".");
            assert_eq!(
                failure_of(verifier.verify(&tampered, Utc::now())),
                AuthenticationFailure::BadSignature,
                "segment {segment_index}"
            );
        }
    }

    #[test]
    fn issuer_and_audience_mismatches_are_distinguished() {
        let keys = keys();
        let issuer = issuer_with(keys.clone(), Duration::from_secs(3600));
        let issued = issuer.issue(request(&[])).expect("issue");

        let wrong_issuer = TokenVerifier::new(
            "https://elsewhere.example.com",
            ISS,
            Algorithm::EdDSA,
            Duration::from_secs(0),
            keys.clone(),
        );
        assert_eq!(
            failure_of(wrong_issuer.verify(&issued.token, Utc::now())),
            AuthenticationFailure::IssuerMismatch
        );

        let wrong_audience = TokenVerifier::new(
            ISS,
            "https://elsewhere.example.com",
            Algorithm::EdDSA,
            Duration::from_secs(0),
            keys,
        );
        assert_eq!(
            failure_of(wrong_audience.verify(&issued.token, Utc::now())),
            AuthenticationFailure::AudienceMismatch
        );
    }

    #[test]
    fn well_signed_but_wrong_shaped_payload_is_malformed() {
        // Signed with the right key, but the payload is not our claims shape.
        let keys = keys();
        let verifier = verifier_with(keys.clone(), Duration::from_secs(0));

        #[derive(serde::Serialize)]
        struct NotClaims {
            hello: String,
        }
        let mut header = jsonwebtoken::Header::new(Algorithm::EdDSA);
        header.kid = Some("auth-test".to_owned());
        let token = jsonwebtoken::encode(
            &header,
            &NotClaims {
                hello: "world".to_owned(),
            },
            keys.signing_key().encoding(),
        )
        .expect("encode");

        assert_eq!(
            failure_of(verifier.verify(&token, Utc::now())),
            AuthenticationFailure::Malformed
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: anything issued verifies immediately against the same
        /// issuer/audience, and the decoded claims match what was signed.
        #[test]
        fn issue_then_verify_round_trips(
            issuer_url in "https://[a-z]{3,12}\\.example\\.com",
            audience_url in "https://[a-z]{3,12}\\.example\\.com",
            ttl_secs in 1u64..86_400,
            perms in proptest::collection::vec("[a-z]{3,10}\\.[a-z]{3,10}", 0..8),
        ) {
            let keys = keys();
            let issuer = TokenIssuer::new(
                issuer_url.clone(),
                audience_url.clone(),
                Duration::from_secs(ttl_secs),
                keys.clone(),
            );
            let verifier = TokenVerifier::new(
                issuer_url,
                audience_url,
                Algorithm::EdDSA,
                Duration::from_secs(0),
                keys,
            );

            let mut req = request(&[]);
            req.permissions = perms.iter().map(|p| PermissionName::new(p.clone())).collect();
            let now = Utc::now();
            let issued = issuer.issue_at(req, now).expect("issue");
            let claims = verifier.verify(&issued.token, now).expect("verify");
            prop_assert_eq!(claims, issued.claims);
        }
    }
}
