mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod storage;
mod webhook;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::Config;
pub use error::{AppError, Result};

use config::StorageBackend;
use storage::{
    IntakeStore, JsonFileIntakeStore, JsonFileResultSlot, MemoryIntakeStore, MemoryResultSlot,
    ResultSlot,
};
use webhook::WebhookRelay;

pub struct AppState {
    pub config: Config,
    pub intake: Arc<dyn IntakeStore>,
    pub results: Arc<dyn ResultSlot>,
    pub relay: WebhookRelay,
}

async fn init_stores(config: &Config) -> Result<(Arc<dyn IntakeStore>, Arc<dyn ResultSlot>)> {
    match config.storage {
        StorageBackend::File => {
            let intake = JsonFileIntakeStore::new(&config.data_file);
            let results = JsonFileResultSlot::new(&config.ai_response_file);

            for (path, created) in [
                (intake.path(), intake.initialize().await?),
                (results.path(), results.initialize().await?),
            ] {
                if created {
                    tracing::info!("Initialized {}", path.display());
                }
            }

            let intake: Arc<dyn IntakeStore> = Arc::new(intake);
            let results: Arc<dyn ResultSlot> = Arc::new(results);
            Ok((intake, results))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, submissions are lost on restart");
            let intake: Arc<dyn IntakeStore> = Arc::new(MemoryIntakeStore::new());
            let results: Arc<dyn ResultSlot> = Arc::new(MemoryResultSlot::new());
            Ok((intake, results))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let config = Config::from_env()?;

    let (intake, results) = init_stores(&config).await?;
    let relay = WebhookRelay::from_config(&config);
    tracing::info!(
        "Forwarding submissions to {} (timeout {}s)",
        relay.url(),
        config.webhook_timeout_secs
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        intake,
        results,
        relay,
    });

    let app = routes::build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("MediTrack+ AI server listening on {}", addr);
    for url in config.display_urls() {
        tracing::info!("  - {}", url);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
