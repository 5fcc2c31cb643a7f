use gatekeeper_auth::{AccountId, Claims, OrganizationId, PermissionName, RoleName};

/// Verified identity for a request, derived from token claims by the auth
/// middleware. Immutable; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    claims: Claims,
}

impl RequestIdentity {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn account_id(&self) -> AccountId {
        self.claims.sub
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.claims.organization_id
    }

    pub fn roles(&self) -> &[RoleName] {
        &self.claims.roles
    }

    pub fn permissions(&self) -> &[PermissionName] {
        &self.claims.permissions
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
