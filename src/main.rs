use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use outfitai::api::AppState;
use outfitai::{CalendarStore, OutfitAiConfig, WeatherService, scheduler, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = OutfitAiConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    let weather = Arc::new(WeatherService::new(&config)?);
    let calendar = Arc::new(
        CalendarStore::new(&config.storage.database_path)
            .context("Failed to open calendar store")?,
    );

    scheduler::start(weather.clone());

    web::run(config.server.port, AppState { weather, calendar }).await
}
