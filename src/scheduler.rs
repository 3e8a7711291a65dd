//! Background cache warmer
//!
//! Keeps the default zone's forecast entry pre-populated so the common
//! request path rarely pays a live fetch. Purely a latency optimization;
//! a cold cache is never an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::weather::WeatherService;

static STARTED: AtomicBool = AtomicBool::new(false);

/// Start the warm loop: one immediate warm of the default zone, then a
/// repeat at the cache TTL interval for the process lifetime.
///
/// Idempotent: subsequent calls are no-ops.
pub fn start(service: Arc<WeatherService>) {
    if STARTED.swap(true, Ordering::SeqCst) {
        debug!("Scheduler already started, skipping");
        return;
    }

    let interval = service
        .cache_ttl()
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(3 * 60 * 60));
    info!("Starting forecast warm scheduler every {:?}", interval);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            // First tick completes immediately, giving the startup warm.
            ticker.tick().await;
            service.warm_default_zone().await;
        }
    });
}
