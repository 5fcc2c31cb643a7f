//! `gatekeeper-auth` — token issuance/verification and permission
//! enforcement.
//!
//! This crate is intentionally decoupled from HTTP and storage: the API
//! layer wires it to transport, and account/role records arrive already
//! loaded. Every operation is synchronous and stateless per call; the only
//! shared resource is the read-only [`KeyManager`], so calls may run
//! concurrently without locking.
//!
//! There is deliberately no revocation mechanism: an issued token stays
//! valid until its natural expiration regardless of later role or account
//! changes.

pub mod account;
pub mod claims;
pub mod config;
pub mod error;
pub mod guard;
pub mod issuer;
pub mod jwks;
pub mod keys;
pub mod permissions;
pub mod roles;
pub mod snapshot;
pub mod verifier;

pub use account::{
    AccountId, AccountRecord, OrganizationId, RoleId, RoleRecord, hash_password, verify_password,
};
pub use claims::{Claims, TokenId, validate_claims};
pub use config::AuthConfig;
pub use error::{
    AccessError, AuthenticationError, AuthenticationFailure, AuthorizationError, ConfigError,
    IssueError, ValidationError,
};
pub use guard::{AccessGrant, OperationPolicy, authorize};
pub use issuer::{IssueRequest, IssuedToken, TokenIssuer};
pub use jwks::{Jwk, Jwks};
pub use keys::KeyManager;
pub use permissions::PermissionName;
pub use roles::RoleName;
pub use snapshot::snapshot_permissions;
pub use verifier::TokenVerifier;
