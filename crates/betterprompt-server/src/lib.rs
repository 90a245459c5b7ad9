pub mod auth;
pub mod config;
pub mod routes;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use betterprompt_db::Database;
use betterprompt_optimizer::{OpenRouterClient, Optimizer};
use tokio::net::TcpListener;
use tracing::info;

use auth::IdentityConfig;
use config::ServerConfig;
use routes::InnerAppState;

/// Optimizer wired to the configured completion endpoint and credentials.
pub fn build_optimizer(config: &ServerConfig) -> Optimizer {
    let client = OpenRouterClient::new(&config.openrouter_url, &config.site_url);
    Optimizer::new(Arc::new(client), config.credentials()).with_deadline(config.deadline())
}

pub async fn serve(
    listener: TcpListener,
    db: Arc<dyn Database>,
    config: &ServerConfig,
) -> Result<()> {
    let optimizer = build_optimizer(config);
    if !optimizer.is_configured() {
        tracing::warn!("no OpenRouter API keys configured; /api/optimize will fail");
    }
    let identity = IdentityConfig::new(db.clone(), config.api_key.as_deref(), &config.default_user);
    if identity.env_key_hash.is_some() {
        info!(user = %config.default_user, "static identity token enabled");
    }

    let state = Arc::new(InnerAppState {
        db,
        optimizer,
        identity,
    });
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
