//! Role-to-permission flattening at issuance time.

use std::collections::HashSet;

use crate::account::RoleRecord;
use crate::permissions::PermissionName;

/// Flatten a role's permission set into the ordered, deduplicated sequence
/// embedded verbatim as `Claims.permissions`.
///
/// This is the single point where role state expands into permissions.
/// Verification reads the embedded snapshot and never consults current role
/// state, so revoking a permission only takes effect once outstanding tokens
/// expire.
pub fn snapshot_permissions(role: &RoleRecord) -> Vec<PermissionName> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(role.permissions.len());
    let mut snapshot = Vec::with_capacity(role.permissions.len());
    for permission in &role.permissions {
        if seen.insert(permission.as_str()) {
            snapshot.push(permission.clone());
        }
    }
    snapshot
}
