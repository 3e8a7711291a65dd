//! `OutfitAI` - Weather-aware wardrobe recommendation backend
//!
//! This library provides the core functionality for resolving a requester to
//! a forecast zone, caching upstream forecast data, and assembling the
//! weather/calendar context block consumed by the recommendation model.

pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod prompt;
pub mod scheduler;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use calendar::{CalendarEntry, CalendarEventMap, CalendarStore};
pub use config::OutfitAiConfig;
pub use error::OutfitAiError;
pub use models::{ForecastCacheEntry, ForecastRow, Location, LocationSource, Region, RegionDirectory};
pub use prompt::{Period, build_prompt_context};
pub use weather::{WeatherBundle, WeatherService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, OutfitAiError>;
