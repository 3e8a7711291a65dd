//! Location model for resolved requester positions

use serde::{Deserialize, Serialize};

/// Default location used when a requester cannot be geolocated (Seoul)
pub const DEFAULT_CITY: &str = "서울";
pub const DEFAULT_REGION: &str = "서울특별시";
pub const DEFAULT_COUNTRY: &str = "대한민국";
pub const DEFAULT_LATITUDE: f64 = 37.5665;
pub const DEFAULT_LONGITUDE: f64 = 126.9780;

/// How a location record was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// Explicit coordinates supplied by the client
    Selected,
    /// Resolved from the client IP via the geolocation service
    GeoIp,
    /// Fallback record (private/absent IP or geolocation failure)
    Default,
}

/// A best-effort location for one inbound request. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Raw client IP the record was derived from, if any
    pub ip: Option<String>,
    pub country: String,
    /// Administrative region name (e.g. "경기도")
    pub region: String,
    /// City name (e.g. "수원")
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Whether this is real data or a degraded default
    pub source: LocationSource,
}

impl Location {
    /// Synthetic record for explicitly selected coordinates
    #[must_use]
    pub fn selected(latitude: f64, longitude: f64) -> Self {
        Self {
            ip: None,
            country: DEFAULT_COUNTRY.to_string(),
            region: String::new(),
            city: "선택한 위치".to_string(),
            latitude,
            longitude,
            source: LocationSource::Selected,
        }
    }

    /// Fixed default location, tagged with whatever raw IP was seen
    #[must_use]
    pub fn default_with_ip(ip: Option<String>) -> Self {
        Self {
            ip,
            country: DEFAULT_COUNTRY.to_string(),
            region: DEFAULT_REGION.to_string(),
            city: DEFAULT_CITY.to_string(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            source: LocationSource::Default,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Display name preferring the most specific component
    #[must_use]
    pub fn display_name(&self) -> &str {
        if !self.city.is_empty() {
            &self.city
        } else if !self.region.is_empty() {
            &self.region
        } else {
            DEFAULT_CITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location_keeps_raw_ip() {
        let location = Location::default_with_ip(Some("10.0.0.7".to_string()));
        assert_eq!(location.ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(location.city, DEFAULT_CITY);
        assert_eq!(location.source, LocationSource::Default);
    }

    #[test]
    fn test_selected_location_skips_region() {
        let location = Location::selected(37.2636, 127.0286);
        assert_eq!(location.source, LocationSource::Selected);
        assert!(location.ip.is_none());
        assert_eq!(location.format_coordinates(), "37.2636, 127.0286");
    }
}
