//! Account listing (read-only view over the directory).
//!
//! Requires `accounts.read`; the middleware enforces it before this handler
//! runs.

use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::dto::AccountSummary;
use crate::app::services::AppServices;

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
) -> impl IntoResponse {
    let accounts: Vec<AccountSummary> = services
        .directory
        .accounts()
        .iter()
        .map(AccountSummary::from)
        .collect();

    Json(serde_json::json!({ "accounts": accounts }))
}
