//! Location Resolution Module
//!
//! Resolves an inbound request (explicit coordinates or client IP) into a
//! best-effort [`Location`]. Every failure path is absorbed locally; this
//! resolver never raises.

use std::net::IpAddr;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::WeatherConfig;
use crate::models::{Location, LocationSource};

/// The per-request inputs location resolution works from
#[derive(Debug, Default, Clone)]
pub struct RequestMeta {
    /// Raw `lat` query parameter, if present
    pub lat: Option<String>,
    /// Raw `lon` query parameter, if present
    pub lon: Option<String>,
    /// Forwarded-header value (comma-separated hops)
    pub forwarded_for: Option<String>,
    /// Transport-level peer address
    pub remote_addr: Option<IpAddr>,
}

/// Resolve a request to a location.
///
/// Explicit numeric coordinates short-circuit to a synthetic "selected
/// location" record with no IP lookup. Otherwise the client IP is
/// extracted, classified, and geolocated; private, absent or
/// unresolvable addresses yield the fixed default location.
pub async fn resolve(client: &Client, config: &WeatherConfig, meta: &RequestMeta) -> Location {
    if let (Some(lat), Some(lon)) = (parse_coordinate(&meta.lat), parse_coordinate(&meta.lon)) {
        debug!("Using selected coordinates ({}, {})", lat, lon);
        return Location::selected(lat, lon);
    }

    let raw_ip = extract_client_ip(meta);
    let Some(ip) = raw_ip.clone() else {
        debug!("No client address present, using default location");
        return Location::default_with_ip(None);
    };

    if !is_routable(&ip) {
        debug!("Client address {} is not routable, using default location", ip);
        return Location::default_with_ip(raw_ip);
    }

    match geolocate(client, config, &ip).await {
        Some(location) => location,
        None => Location::default_with_ip(raw_ip),
    }
}

fn parse_coordinate(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()?.trim().parse().ok()
}

/// Client IP: first forwarded-header entry, else the transport address.
/// The IPv6-mapped-IPv4 prefix is stripped either way.
fn extract_client_ip(meta: &RequestMeta) -> Option<String> {
    let from_header = meta
        .forwarded_for
        .as_deref()
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|entry| !entry.is_empty());

    let raw = match from_header {
        Some(entry) => entry.to_string(),
        None => meta.remote_addr?.to_string(),
    };

    Some(raw.strip_prefix("::ffff:").unwrap_or(&raw).to_string())
}

/// Private and loopback ranges are non-routable; so is anything that does
/// not parse as an address.
fn is_routable(ip: &str) -> bool {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => !v4.is_loopback() && !v4.is_private(),
        Ok(IpAddr::V6(v6)) => !v6.is_loopback(),
        Err(_) => false,
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    status: String,
    #[serde(default)]
    country: String,
    #[serde(default, rename = "regionName")]
    region_name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
    #[serde(default)]
    query: String,
}

/// Look up a routable public IP. Any failure (non-OK response, bad JSON,
/// transport error, non-"success" status) returns `None` and the caller
/// falls back to the default location.
async fn geolocate(client: &Client, config: &WeatherConfig, ip: &str) -> Option<Location> {
    let url = format!("{}/{}?lang=ko", config.geolocation_base_url, ip);

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("Geolocation request failed for {}: {}", ip, e);
            return None;
        }
    };

    if !response.status().is_success() {
        warn!("Geolocation returned status {} for {}", response.status(), ip);
        return None;
    }

    let geo: GeoResponse = match response.json().await {
        Ok(geo) => geo,
        Err(e) => {
            warn!("Geolocation response was malformed for {}: {}", ip, e);
            return None;
        }
    };

    if geo.status != "success" {
        warn!("Geolocation lookup unsuccessful for {}: {}", ip, geo.status);
        return None;
    }

    debug!("Geolocated {} to {} {}", ip, geo.region_name, geo.city);
    Some(Location {
        ip: Some(if geo.query.is_empty() {
            ip.to_string()
        } else {
            geo.query
        }),
        country: geo.country,
        region: geo.region_name,
        city: geo.city,
        latitude: geo.lat,
        longitude: geo.lon,
        source: LocationSource::GeoIp,
    })
}
