//! Static forecast-region directory
//!
//! Maps city and region names to the upstream forecast-zone identifiers.
//! The directory is loaded once from a JSON resource and read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Location;

/// Zone used when the directory resource is missing or has no match (Seoul)
pub const FALLBACK_ZONE_ID: &str = "11B10101";

/// One entry of the region directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Broad grouping (e.g. "수도권")
    pub area: String,
    /// Human-readable region name (e.g. "수원")
    pub name: String,
    /// Upstream forecast-zone identifier (e.g. "11B20601")
    pub zone_id: String,
}

/// Directory of regions plus the name-to-zone lookup maps.
/// Built once per service instance and never mutated after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDirectory {
    pub default_zone_id: String,
    #[serde(default)]
    pub city_to_zone: HashMap<String, String>,
    #[serde(default)]
    pub region_to_zone: HashMap<String, String>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl RegionDirectory {
    /// Load the directory from a JSON resource.
    ///
    /// Fail-soft: a missing or malformed resource logs a warning and yields
    /// an empty directory carrying only the fallback zone.
    #[must_use]
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<RegionDirectory>(&raw) {
                Ok(directory) => directory,
                Err(e) => {
                    warn!("Malformed region directory at {}: {}", path.display(), e);
                    Self::empty()
                }
            },
            Err(e) => {
                warn!("Region directory unavailable at {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Empty directory with only the hard-coded default zone
    #[must_use]
    pub fn empty() -> Self {
        Self {
            default_zone_id: FALLBACK_ZONE_ID.to_string(),
            city_to_zone: HashMap::new(),
            region_to_zone: HashMap::new(),
            regions: Vec::new(),
        }
    }

    /// Find a region by zone id. Linear scan, trimmed comparison.
    #[must_use]
    pub fn find_region_by_zone_id(&self, zone_id: &str) -> Option<&Region> {
        let wanted = zone_id.trim();
        self.regions.iter().find(|r| r.zone_id.trim() == wanted)
    }

    /// Resolve a location to a zone id.
    ///
    /// Specificity cascade, in order: exact city key, combined
    /// "region city" key, region-only key, linear name scan, directory
    /// default. More specific keys always win.
    #[must_use]
    pub fn resolve_zone_id(&self, location: &Location) -> &str {
        let city = location.city.trim();
        let region = location.region.trim();

        if !city.is_empty() {
            if let Some(zone) = self.city_to_zone.get(city) {
                return zone;
            }
        }

        if !region.is_empty() && !city.is_empty() {
            let combined = format!("{region} {city}");
            if let Some(zone) = self.city_to_zone.get(combined.as_str()) {
                return zone;
            }
        }

        if !region.is_empty() {
            if let Some(zone) = self.region_to_zone.get(region) {
                return zone;
            }
        }

        // Duplicate names across area groupings resolve to the first match
        // in list order.
        if let Some(hit) = self
            .regions
            .iter()
            .find(|r| r.name == city || r.name == region)
        {
            return &hit.zone_id;
        }

        &self.default_zone_id
    }
}
