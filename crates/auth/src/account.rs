//! Read-side account and role records.
//!
//! Account/role/permission storage is owned by an external collaborator; the
//! core only reads this flattened view once, at login time, to snapshot
//! permissions into the token. Nothing here is consulted at verification
//! time.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::PermissionName;
use crate::roles::RoleName;

/// Identifier of an account (token subject).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

/// Identifier of the organization an account belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(Uuid);

/// Identifier of a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty) => {
        impl $t {
            /// Create a new identifier (UUIDv7, time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::from_str(s)?))
            }
        }
    };
}

impl_uuid_newtype!(AccountId);
impl_uuid_newtype!(OrganizationId);
impl_uuid_newtype!(RoleId);

/// A role and its permission set, as loaded by the persistence collaborator.
///
/// Permission names within one role are unique by construction in storage;
/// the snapshot still deduplicates defensively before embedding them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: RoleName,
    pub permissions: Vec<PermissionName>,
}

/// An account as loaded at login time. Exactly one role per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub email: String,
    /// bcrypt hash of the account password.
    pub password_hash: String,
    pub organization_id: Option<OrganizationId>,
    pub role: RoleRecord,
}

/// bcrypt only considers the first 72 bytes of input.
const BCRYPT_MAX_BYTES: usize = 72;

fn bcrypt_input(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)]
}

/// Hash a plain-text password for storage.
///
/// Input beyond 72 bytes is truncated before hashing so that hashing and
/// verification agree on long passwords.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(bcrypt_input(password), bcrypt::DEFAULT_COST)
}

/// Verify a plain-text password against a stored hash.
///
/// An unparseable stored hash counts as a failed verification rather than an
/// error; the caller cannot do anything else with it.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(bcrypt_input(password), password_hash).unwrap_or(false)
}
