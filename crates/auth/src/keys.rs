//! Signing and verification key material.
//!
//! A `KeyManager` is immutable after construction and shared by reference
//! (`Arc`) across issuer, verifier, and JWKS publication. Rotation never
//! mutates a live key set: construct the successor with [`KeyManager::rotate`]
//! and swap the shared reference, so concurrent readers always observe a
//! complete set.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey};
use ed25519_dalek::{SigningKey as Ed25519SigningKey, VerifyingKey};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rand::rngs::OsRng;

use crate::config::AuthConfig;
use crate::error::ConfigError;

/// The private half used for signing. Constructed only by `KeyManager`;
/// the encoding key itself is crate-private so nothing outside the issuer
/// can reach the signing material.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    encoding: EncodingKey,
}

impl SigningKey {
    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Key material must never end up in logs.
        f.debug_struct("SigningKey").field("kid", &self.kid).finish()
    }
}

/// A public verification key, addressable by kid.
#[derive(Clone)]
pub struct VerificationKey {
    kid: String,
    decoding: DecodingKey,
    /// Raw Ed25519 public key bytes, kept for JWKS publication.
    public: [u8; 32],
}

impl VerificationKey {
    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn public_bytes(&self) -> &[u8; 32] {
        &self.public
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl core::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .finish()
    }
}

/// Process-wide key set: exactly one signing key and one-or-more
/// verification keys (the rotation window).
#[derive(Debug, Clone)]
pub struct KeyManager {
    signing: SigningKey,
    verification: Vec<VerificationKey>,
    algorithm: Algorithm,
}

impl KeyManager {
    /// Load key material from configuration.
    ///
    /// Any failure here is fatal: the process must not start without a
    /// usable signing key, and a request can never observe this error.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        if config.signing_key.trim().is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }

        let pem = decode_wrapped_pem(&config.signing_key)
            .map_err(|reason| ConfigError::invalid_key(&config.signing_kid, reason))?;
        let signing = Ed25519SigningKey::from_pkcs8_pem(&pem)
            .map_err(|e| ConfigError::invalid_key(&config.signing_kid, e))?;

        let mut manager =
            Self::from_signing_key(config.signing_kid.clone(), &signing, config.algorithm)?;

        for (kid, material) in &config.verification_keys {
            if *kid == config.signing_kid {
                continue;
            }
            let pem = decode_wrapped_pem(material)
                .map_err(|reason| ConfigError::invalid_key(kid, reason))?;
            let key = VerifyingKey::from_public_key_pem(&pem)
                .map_err(|e| ConfigError::invalid_key(kid, e))?;
            manager.verification.push(verification_entry(kid.clone(), &key)?);
        }

        Ok(manager)
    }

    /// Build a manager around a freshly generated Ed25519 key pair.
    ///
    /// For development and tests; production deployments load PEM material
    /// through [`KeyManager::from_config`].
    pub fn generate(kid: impl Into<String>) -> Result<Self, ConfigError> {
        let signing = Ed25519SigningKey::generate(&mut OsRng);
        Self::from_signing_key(kid.into(), &signing, Algorithm::EdDSA)
    }

    /// Construct the successor key set for rotation: a fresh signing key
    /// under `kid`, with every previously known public key still in the
    /// verification set so outstanding tokens keep verifying.
    pub fn rotate(&self, kid: impl Into<String>) -> Result<Self, ConfigError> {
        let signing = Ed25519SigningKey::generate(&mut OsRng);
        let mut next = Self::from_signing_key(kid.into(), &signing, self.algorithm)?;
        for key in &self.verification {
            if next.verification.iter().all(|k| k.kid != key.kid) {
                next.verification.push(key.clone());
            }
        }
        Ok(next)
    }

    fn from_signing_key(
        kid: String,
        signing: &Ed25519SigningKey,
        algorithm: Algorithm,
    ) -> Result<Self, ConfigError> {
        // jsonwebtoken expects PKCS#8 DER for EdDSA signing keys.
        let der = signing
            .to_pkcs8_der()
            .map_err(|e| ConfigError::invalid_key(&kid, e))?;
        let encoding = EncodingKey::from_ed_der(der.as_bytes());
        let verification = vec![verification_entry(kid.clone(), &signing.verifying_key())?];

        Ok(Self {
            signing: SigningKey { kid, encoding },
            verification,
            algorithm,
        })
    }

    /// The signing key. Only the token issuer has a use for this.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    /// Resolve a verification key by kid.
    pub fn verification_key(&self, kid: &str) -> Option<&VerificationKey> {
        self.verification.iter().find(|key| key.kid == kid)
    }

    /// Every currently valid verification key, signing key's public half
    /// included.
    pub fn verification_keys(&self) -> impl Iterator<Item = &VerificationKey> {
        self.verification.iter()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

fn verification_entry(kid: String, key: &VerifyingKey) -> Result<VerificationKey, ConfigError> {
    // jsonwebtoken builds EdDSA decoding keys from the JWK `x` component.
    let x = URL_SAFE_NO_PAD.encode(key.to_bytes());
    let decoding =
        DecodingKey::from_ed_components(&x).map_err(|e| ConfigError::invalid_key(&kid, e))?;
    Ok(VerificationKey {
        kid,
        decoding,
        public: key.to_bytes(),
    })
}

/// Configuration stores PEM wrapped in another layer of base64 so the whole
/// document fits in a single environment variable.
fn decode_wrapped_pem(material: &str) -> Result<String, String> {
    let bytes = STANDARD
        .decode(material.trim())
        .map_err(|e| format!("base64 decode failed: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("PEM is not UTF-8: {e}"))
}
