//! Weather aggregation service
//!
//! Composes the region directory, the per-zone forecast cache and the live
//! advisory fetch into one weather bundle per request. The directory and the
//! cache are owned state constructed once and injected where needed; there
//! are no module-level singletons.

use anyhow::Result;
use chrono::Duration;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::OutfitAiConfig;
use crate::location_resolver::{self, RequestMeta};
use crate::models::{ForecastCacheEntry, ForecastRow, Location, Region, RegionDirectory};

pub mod cache;
pub mod kma;

use cache::{FetchForecast, ForecastCache};

/// Everything the prompt builder and the weather endpoint need for one
/// request. Constructed fresh per request, never cached.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherBundle {
    pub location: Location,
    pub zone_id: String,
    /// Human-readable name of the resolved zone
    pub region_name: String,
    /// Directory entry for the zone, when one exists
    pub region: Option<Region>,
    pub forecast: ForecastCacheEntry,
    /// Raw advisory payload; `None` when the live fetch degraded
    pub advisory: Option<String>,
    /// Full region directory, for client-side region pickers
    pub region_meta: RegionDirectory,
}

pub struct WeatherService {
    client: Client,
    config: OutfitAiConfig,
    regions: OnceCell<RegionDirectory>,
    cache: ForecastCache,
}

impl WeatherService {
    /// Build the service from configuration. The HTTP client is shared by
    /// every upstream call the service makes.
    pub fn new(config: &OutfitAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(u64::from(
                config.weather.timeout_seconds,
            )))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            regions: OnceCell::new(),
            cache: ForecastCache::new(Duration::hours(i64::from(
                config.weather.cache_ttl_hours,
            ))),
        })
    }

    /// The region directory, loaded on first use and cached for the
    /// service lifetime. Loading is fail-soft.
    pub async fn region_directory(&self) -> &RegionDirectory {
        self.regions
            .get_or_init(|| async { RegionDirectory::load(&self.config.regions.directory_path) })
            .await
    }

    /// Default zone to keep warm: the directory's default.
    pub async fn default_zone_id(&self) -> String {
        self.region_directory().await.default_zone_id.clone()
    }

    /// Cache TTL, also the scheduler's warm interval.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.config.weather.cache_ttl_hours))
    }

    /// Top-level entry point: decide between explicit-coordinate and
    /// IP-based resolution, then aggregate weather for the location.
    pub async fn weather_for_request(&self, meta: &RequestMeta) -> WeatherBundle {
        let location = location_resolver::resolve(&self.client, &self.config.weather, meta).await;
        self.weather_for_location(location).await
    }

    /// Aggregate a weather bundle for an already-resolved location.
    ///
    /// Forecast (cached) and advisories (always live) are fetched
    /// concurrently; both must complete before the bundle is returned.
    pub async fn weather_for_location(&self, location: Location) -> WeatherBundle {
        let directory = self.region_directory().await;
        let zone_id = directory.resolve_zone_id(&location).to_string();
        let region = directory.find_region_by_zone_id(&zone_id).cloned();
        let region_name = region
            .as_ref()
            .map_or_else(|| location.display_name().to_string(), |r| r.name.clone());

        debug!(
            "Resolved {} to zone {} ({})",
            location.display_name(),
            zone_id,
            region_name
        );

        let (forecast, advisory) = futures::join!(
            self.cache.get_forecast(&zone_id, &region_name, self),
            self.fetch_advisory(),
        );

        WeatherBundle {
            location,
            zone_id,
            region_name,
            region,
            forecast,
            advisory,
            region_meta: directory.clone(),
        }
    }

    /// Warm the default zone's cache entry. Errors never propagate; a cold
    /// cache only costs the next request a live fetch.
    pub async fn warm_default_zone(&self) {
        let zone_id = self.default_zone_id().await;
        let name = self
            .region_directory()
            .await
            .find_region_by_zone_id(&zone_id)
            .map_or_else(|| zone_id.clone(), |r| r.name.clone());

        let entry = self.cache.get_forecast(&zone_id, &name, self).await;
        debug!(
            "Warmed zone {} with {} forecast rows",
            zone_id,
            entry.items.len()
        );
    }

    async fn fetch_advisory(&self) -> Option<String> {
        match kma::fetch_advisories(&self.client, &self.config.weather).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Advisory fetch degraded: {:#}", e);
                None
            }
        }
    }
}

impl FetchForecast for WeatherService {
    async fn fetch(&self, zone_id: &str) -> Result<Vec<ForecastRow>> {
        kma::fetch_forecast_rows(&self.client, &self.config.weather, zone_id).await
    }
}

impl WeatherBundle {
    /// Forecast rows whose effective time falls on the given compact date
    /// (YYYYMMDD).
    #[must_use]
    pub fn rows_for_compact_date(&self, compact: &str) -> Vec<&ForecastRow> {
        self.forecast
            .items
            .iter()
            .filter(|row| row.covers_compact_date(compact))
            .collect()
    }
}
