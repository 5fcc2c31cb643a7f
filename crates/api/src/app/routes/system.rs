use axum::{Json, response::IntoResponse};

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "gatekeeper",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "gatekeeper",
        "status": "operational",
    }))
}
