//! Account directory and issuer wiring.

use std::sync::Arc;

use gatekeeper_auth::{
    AccountId, AccountRecord, KeyManager, OrganizationId, PermissionName, RoleId, RoleName,
    RoleRecord, TokenIssuer, hash_password,
};

/// Services shared by route handlers.
pub struct AppServices {
    pub issuer: TokenIssuer,
    pub keys: Arc<KeyManager>,
    pub directory: Arc<dyn AccountDirectory>,
}

/// Account lookup for login and listing.
///
/// Real deployments back this with persistent storage; the in-memory
/// implementation mirrors the development seed data and keeps the HTTP layer
/// testable without a database.
pub trait AccountDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<AccountRecord>;
    fn accounts(&self) -> Vec<AccountRecord>;
    fn roles(&self) -> Vec<RoleRecord>;
}

pub struct InMemoryDirectory {
    accounts: Vec<AccountRecord>,
}

impl InMemoryDirectory {
    pub fn new(accounts: Vec<AccountRecord>) -> Self {
        Self { accounts }
    }

    /// Development seed: one admin and one regular user.
    pub fn seeded() -> Self {
        let organization = OrganizationId::new();

        let admin_role = role(
            "Admin",
            &[
                "accounts.create",
                "accounts.read",
                "accounts.update",
                "accounts.delete",
                "roles.create",
                "roles.read",
                "roles.update",
                "roles.delete",
                "permissions.read",
            ],
        );
        let user_role = role("User", &["accounts.read"]);

        Self::new(vec![
            account("admin@example.com", "admin123", organization, admin_role),
            account("user@example.com", "user123", organization, user_role),
        ])
    }
}

impl AccountDirectory for InMemoryDirectory {
    fn find_by_email(&self, email: &str) -> Option<AccountRecord> {
        self.accounts
            .iter()
            .find(|account| account.email == email)
            .cloned()
    }

    fn accounts(&self) -> Vec<AccountRecord> {
        self.accounts.clone()
    }

    fn roles(&self) -> Vec<RoleRecord> {
        let mut roles: Vec<RoleRecord> = Vec::new();
        for account in &self.accounts {
            if roles.iter().all(|r| r.id != account.role.id) {
                roles.push(account.role.clone());
            }
        }
        roles
    }
}

fn role(name: &'static str, permissions: &[&'static str]) -> RoleRecord {
    RoleRecord {
        id: RoleId::new(),
        name: RoleName::new(name),
        permissions: permissions.iter().map(|p| PermissionName::new(*p)).collect(),
    }
}

fn account(
    email: &str,
    password: &str,
    organization: OrganizationId,
    role: RoleRecord,
) -> AccountRecord {
    AccountRecord {
        id: AccountId::new(),
        email: email.to_owned(),
        // Bootstrap-only path; bcrypt with a valid cost does not fail.
        password_hash: hash_password(password).expect("hash seed password"),
        organization_id: Some(organization),
        role,
    }
}
