use std::sync::Arc;

use gatekeeper_api::app;
use gatekeeper_api::app::services::InMemoryDirectory;
use gatekeeper_auth::{AuthConfig, KeyManager};

#[tokio::main]
async fn main() {
    gatekeeper_observability::init();

    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "configuration is invalid");
            std::process::exit(1);
        }
    };

    // Key misconfiguration is fatal: never start without a usable signing key.
    let keys = match KeyManager::from_config(&config) {
        Ok(keys) => Arc::new(keys),
        Err(err) => {
            tracing::error!(error = %err, "signing keys unusable; refusing to start");
            std::process::exit(1);
        }
    };

    let directory = Arc::new(InMemoryDirectory::seeded());
    let app = app::build_app(config, keys, directory);

    let port: u16 = std::env::var("GATEKEEPER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8001);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
