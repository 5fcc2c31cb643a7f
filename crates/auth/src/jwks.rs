//! Published verification keys (JWKS).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::keys::KeyManager;

/// A single public verification key in standard JWK form.
///
/// Keys are Ed25519, so this is the OKP shape: the public material is the
/// `x` component, base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub use_: String,
    pub alg: String,
    pub crv: String,
    pub x: String,
}

/// The full key set served to external verifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl Jwks {
    /// Publish every currently valid verification key.
    ///
    /// Private material has no representation here by construction; only
    /// the public bytes ever leave the key manager.
    pub fn publish(keys: &KeyManager) -> Self {
        Self {
            keys: keys
                .verification_keys()
                .map(|key| Jwk {
                    kty: "OKP".to_owned(),
                    kid: key.kid().to_owned(),
                    use_: "sig".to_owned(),
                    alg: "EdDSA".to_owned(),
                    crv: "Ed25519".to_owned(),
                    x: URL_SAFE_NO_PAD.encode(key.public_bytes()),
                })
                .collect(),
        }
    }
}
