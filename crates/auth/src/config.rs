//! Runtime configuration for token issuance and verification.
//!
//! Values only, no behavior: the key manager, issuer, verifier, and guard all
//! read from one immutable `AuthConfig` built at startup. A bad value is a
//! `ConfigError` and halts the process before it can serve a request.

use std::collections::BTreeMap;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::error::ConfigError;

/// Default issuer/audience used when the environment does not override them.
pub const DEFAULT_ISSUER: &str = "https://api.example.com";

/// Default token time-to-live: 7 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default clock-skew tolerance applied to `iat`/`exp` checks.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(30);

const DEFAULT_SIGNING_KID: &str = "auth-2025-10-15";

/// Operations reachable without a token.
const DEFAULT_PUBLIC_OPERATIONS: [&str; 5] = [
    "/",
    "/health",
    "/api/v1/health",
    "/api/v1/auth/login",
    "/api/v1/auth/jwks",
];

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    /// Default TTL for issued tokens; issuance requests may override it.
    pub token_ttl: Duration,
    /// Key id the signing key is published under.
    pub signing_kid: String,
    /// Accepted signature algorithm. Fixed here and never taken from a token
    /// header when selecting the verification method.
    pub algorithm: Algorithm,
    pub clock_skew: Duration,
    /// Base64-wrapped PKCS#8 PEM for the Ed25519 signing key. Empty means
    /// "not configured", which is fatal at key-manager construction.
    pub signing_key: String,
    /// Extra verification keys (kid -> base64-wrapped SPKI PEM) kept valid
    /// during a rotation window. The signing key's public half is always in
    /// the verification set implicitly.
    pub verification_keys: BTreeMap<String, String>,
    /// Request paths that bypass authentication entirely.
    pub public_operations: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_owned(),
            audience: DEFAULT_ISSUER.to_owned(),
            token_ttl: DEFAULT_TTL,
            signing_kid: DEFAULT_SIGNING_KID.to_owned(),
            algorithm: Algorithm::EdDSA,
            clock_skew: DEFAULT_CLOCK_SKEW,
            signing_key: String::new(),
            verification_keys: BTreeMap::new(),
            public_operations: DEFAULT_PUBLIC_OPERATIONS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from `GATEKEEPER_*` environment variables,
    /// falling back to defaults for everything except key material.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(issuer) = std::env::var("GATEKEEPER_JWT_ISSUER") {
            config.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("GATEKEEPER_JWT_AUDIENCE") {
            config.audience = audience;
        }
        if let Ok(ttl) = std::env::var("GATEKEEPER_JWT_TTL_SECS") {
            config.token_ttl = parse_seconds("GATEKEEPER_JWT_TTL_SECS", &ttl)?;
        }
        if let Ok(kid) = std::env::var("GATEKEEPER_JWT_KID") {
            config.signing_kid = kid;
        }
        if let Ok(algorithm) = std::env::var("GATEKEEPER_JWT_ALGORITHM") {
            config.algorithm = parse_algorithm(&algorithm)?;
        }
        if let Ok(skew) = std::env::var("GATEKEEPER_JWT_CLOCK_SKEW_SECS") {
            config.clock_skew = parse_seconds("GATEKEEPER_JWT_CLOCK_SKEW_SECS", &skew)?;
        }
        if let Ok(key) = std::env::var("GATEKEEPER_JWT_PRIVATE_KEY") {
            config.signing_key = key;
        }
        if let Ok(keys) = std::env::var("GATEKEEPER_JWT_PUBLIC_KEYS") {
            config.verification_keys = parse_verification_keys(&keys)?;
        }
        if let Ok(paths) = std::env::var("GATEKEEPER_PUBLIC_OPERATIONS") {
            config.public_operations = paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect();
        }

        Ok(config)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_operations.iter().any(|p| p == path)
    }
}

fn parse_seconds(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid_value(key, e))?;
    Ok(Duration::from_secs(secs))
}

/// Parse the accepted signature algorithm.
///
/// Key material is Ed25519, so EdDSA is the only algorithm this service can
/// actually verify; anything else is a misconfiguration, not a request-time
/// concern.
pub fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.trim() {
        "EdDSA" => Ok(Algorithm::EdDSA),
        other => Err(ConfigError::UnsupportedAlgorithm(other.to_owned())),
    }
}

/// Parse `kid=material,kid=material` pairs for the rotation window.
fn parse_verification_keys(value: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut keys = BTreeMap::new();
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (kid, material) = entry.split_once('=').ok_or_else(|| {
            ConfigError::invalid_value(
                "GATEKEEPER_JWT_PUBLIC_KEYS",
                format!("expected kid=material, got '{entry}'"),
            )
        })?;
        keys.insert(kid.trim().to_owned(), material.trim().to_owned());
    }
    Ok(keys)
}
