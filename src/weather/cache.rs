//! Per-zone forecast cache
//!
//! Pure in-memory, non-durable, reset on restart. An entry is served as-is
//! while it is non-empty and younger than the TTL; otherwise a live fetch
//! replaces it. Concurrent refreshes of the same zone are serialized by a
//! per-zone lock so only one upstream call is made; distinct zones refresh
//! independently.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::models::{ForecastCacheEntry, ForecastRow};

/// Source of live forecast rows. The seam exists so the cache can be
/// exercised without network access.
pub trait FetchForecast {
    fn fetch(
        &self,
        zone_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ForecastRow>>> + Send;
}

pub struct ForecastCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, ForecastCacheEntry>>,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ForecastCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Cached entry for a zone, refreshed when absent, empty or expired.
    ///
    /// A fetch failure is absorbed here: the zone gets a fresh-stamped entry
    /// with an empty item list, so the next call retries. Last write wins.
    pub async fn get_forecast<F: FetchForecast>(
        &self,
        zone_id: &str,
        name: &str,
        fetcher: &F,
    ) -> ForecastCacheEntry {
        if let Some(entry) = self.lookup_fresh(zone_id).await {
            debug!("Forecast cache hit for zone {}", zone_id);
            return entry;
        }

        let lock = self.refresh_lock(zone_id).await;
        let _guard = lock.lock().await;

        // Another request may have refreshed the zone while we waited.
        if let Some(entry) = self.lookup_fresh(zone_id).await {
            debug!("Forecast cache refreshed concurrently for zone {}", zone_id);
            return entry;
        }

        debug!("Forecast cache refresh for zone {}", zone_id);
        let items = match fetcher.fetch(zone_id).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Forecast fetch failed for zone {}: {:#}", zone_id, e);
                Vec::new()
            }
        };

        let entry = ForecastCacheEntry::new(zone_id.to_string(), name.to_string(), items);
        self.entries
            .write()
            .await
            .insert(zone_id.to_string(), entry.clone());
        entry
    }

    /// Insert an entry directly, overwriting any prior one for the zone.
    pub async fn put(&self, entry: ForecastCacheEntry) {
        self.entries
            .write()
            .await
            .insert(entry.zone_id.clone(), entry);
    }

    async fn lookup_fresh(&self, zone_id: &str) -> Option<ForecastCacheEntry> {
        let entries = self.entries.read().await;
        let entry = entries.get(zone_id)?;
        if entry.items.is_empty() {
            return None;
        }
        if Utc::now() - entry.updated_at >= self.ttl {
            debug!("Forecast cache entry expired for zone {}", zone_id);
            return None;
        }
        Some(entry.clone())
    }

    async fn refresh_lock(&self, zone_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        locks
            .entry(zone_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
