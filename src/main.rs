//! Print shop inventory - stock, cost and plate printing service

use std::sync::Arc;
use anyhow::Result;
use printshop_inventory::{api, AppConfig, JsonFileStore, Repository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let store = JsonFileStore::open(config.data_dir.clone()).await?;
    tracing::info!(data_dir = %store.root().display(), "opened table store");
    let repo = Repository::new(Arc::new(store));
    if config.seed_catalog {
        repo.seed_catalog_if_empty().await?;
    }

    let mut state = api::AppState::new(repo, config.default_plate_cost);
    if let Some(url) = &config.nats_url {
        match async_nats::connect(url.as_str()).await {
            Ok(client) => {
                tracing::info!(%url, "publishing domain events to NATS");
                state = state.with_nats(client);
            }
            Err(e) => tracing::warn!(%url, error = %e, "NATS unavailable, events will not be published"),
        }
    }

    let app = api::router(state);
    tracing::info!("🚀 Print shop inventory listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app).await?;
    Ok(())
}
