//! Core data models for weather resolution and forecasting

pub mod forecast;
pub mod location;
pub mod region;

pub use forecast::{ForecastCacheEntry, ForecastRow};
pub use location::{Location, LocationSource};
pub use region::{Region, RegionDirectory};
