//! Route access policies.
//!
//! Each operation's required permissions are declared here and enforced by a
//! single guard invocation in the auth middleware, before any handler runs.
//! Public paths come from configuration.

use gatekeeper_auth::{AuthConfig, OperationPolicy, PermissionName};

pub struct RoutePolicies {
    public: Vec<String>,
}

impl RoutePolicies {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            public: config.public_operations.clone(),
        }
    }

    /// The access policy for a request path.
    ///
    /// Unlisted protected paths require authentication but no particular
    /// permission; handlers for such routes only need the caller's identity.
    pub fn for_path(&self, path: &str) -> OperationPolicy {
        if self.public.iter().any(|p| p == path) {
            return OperationPolicy::public_operation();
        }

        match path {
            "/api/v1/accounts" => {
                OperationPolicy::requiring(vec![PermissionName::new("accounts.read")])
            }
            "/api/v1/roles" => OperationPolicy::requiring(vec![PermissionName::new("roles.read")]),
            _ => OperationPolicy::authenticated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_come_from_config() {
        let policies = RoutePolicies::from_config(&AuthConfig::default());
        assert!(policies.for_path("/health").public);
        assert!(policies.for_path("/api/v1/auth/login").public);
        assert!(!policies.for_path("/api/v1/auth/me").public);
    }

    #[test]
    fn resource_listings_require_read_permissions() {
        let policies = RoutePolicies::from_config(&AuthConfig::default());
        assert_eq!(
            policies.for_path("/api/v1/accounts").required,
            vec![PermissionName::new("accounts.read")]
        );
        assert_eq!(
            policies.for_path("/api/v1/roles").required,
            vec![PermissionName::new("roles.read")]
        );
        assert!(policies.for_path("/api/v1/auth/me").required.is_empty());
    }
}
