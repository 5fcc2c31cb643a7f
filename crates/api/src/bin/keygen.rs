//! Generate a fresh Ed25519 key pair in the configuration encoding.
//!
//! Prints base64-wrapped PEM values ready to paste into the environment:
//! the private key for `GATEKEEPER_JWT_PRIVATE_KEY`, the public key for a
//! `GATEKEEPER_JWT_PUBLIC_KEYS` rotation entry on other instances.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::SigningKey;
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;

fn main() -> anyhow::Result<()> {
    let key = SigningKey::generate(&mut OsRng);

    let private_pem = key.to_pkcs8_pem(LineEnding::LF)?;
    let public_pem = key.verifying_key().to_public_key_pem(LineEnding::LF)?;

    println!(
        "GATEKEEPER_JWT_PRIVATE_KEY={}",
        STANDARD.encode(private_pem.as_bytes())
    );
    println!("GATEKEEPER_JWT_PUBLIC_KEY={}", STANDARD.encode(public_pem));

    Ok(())
}
