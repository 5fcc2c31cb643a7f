//! Role visibility endpoints.
//!
//! Requires `roles.read`; enforced by the middleware policy table.

use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::dto::RoleSummary;
use crate::app::services::AppServices;

pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let roles: Vec<RoleSummary> = services
        .directory
        .roles()
        .iter()
        .map(RoleSummary::from)
        .collect();

    Json(serde_json::json!({ "roles": roles }))
}
