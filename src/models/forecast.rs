//! Upstream forecast rows and their fixed-width table parser

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of whitespace-delimited columns in an upstream forecast line.
/// The final column is free text and may itself contain whitespace.
pub const COLUMN_COUNT: usize = 17;

/// Upstream temperature values at or below this are missing-data markers
const TEMPERATURE_SENTINEL: f64 = -90.0;

/// One parsed forecast row. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Forecast-zone identifier (REG_ID)
    pub zone_id: String,
    /// Publication timestamp, YYYYMMDDHHMM (TM_FC)
    pub issue_time: String,
    /// Timestamp the row describes, YYYYMMDDHHMM (TM_EF)
    pub effective_time: String,
    pub mode: String,
    pub ne: String,
    pub station: String,
    pub cycle: String,
    pub man_id: String,
    pub man_fc: String,
    /// Wind direction codes
    pub wind1: String,
    pub time_range: String,
    pub wind2: String,
    /// Temperature in Celsius as reported (may be a sentinel)
    pub temperature: String,
    /// Precipitation probability in percent
    pub precip_prob: String,
    /// Sky-state code (e.g. "DB03")
    pub sky: String,
    /// Precipitation-type code
    pub precip_type: String,
    /// Free-text weather summary (e.g. "맑음"), quotes stripped
    pub summary: String,
}

impl ForecastRow {
    /// Numeric temperature, excluding sentinel and non-numeric values
    #[must_use]
    pub fn temperature_value(&self) -> Option<f64> {
        let value: f64 = self.temperature.trim().parse().ok()?;
        if value <= TEMPERATURE_SENTINEL {
            None
        } else {
            Some(value)
        }
    }

    /// Whether this row describes the given compact date (YYYYMMDD)
    #[must_use]
    pub fn covers_compact_date(&self, compact: &str) -> bool {
        self.effective_time.starts_with(compact)
    }
}

/// Parse an upstream text table into forecast rows.
///
/// Empty lines and `#` comment lines are skipped; lines with fewer than
/// [`COLUMN_COUNT`] tokens are discarded. All tokens beyond the fixed
/// columns are re-joined into the free-text summary.
#[must_use]
pub fn parse_forecast_table(body: &str) -> Vec<ForecastRow> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_forecast_line)
        .collect()
}

fn parse_forecast_line(line: &str) -> Option<ForecastRow> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < COLUMN_COUNT {
        return None;
    }

    let summary = tokens[COLUMN_COUNT - 1..]
        .join(" ")
        .trim_matches('"')
        .to_string();

    Some(ForecastRow {
        zone_id: tokens[0].to_string(),
        issue_time: tokens[1].to_string(),
        effective_time: tokens[2].to_string(),
        mode: tokens[3].to_string(),
        ne: tokens[4].to_string(),
        station: tokens[5].to_string(),
        cycle: tokens[6].to_string(),
        man_id: tokens[7].to_string(),
        man_fc: tokens[8].to_string(),
        wind1: tokens[9].to_string(),
        time_range: tokens[10].to_string(),
        wind2: tokens[11].to_string(),
        temperature: tokens[12].to_string(),
        precip_prob: tokens[13].to_string(),
        sky: tokens[14].to_string(),
        precip_type: tokens[15].to_string(),
        summary,
    })
}

/// Cached forecast rows for one zone.
///
/// Owned exclusively by the forecast cache; lives until TTL expiry or
/// process restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCacheEntry {
    pub zone_id: String,
    /// Human-readable zone name
    pub name: String,
    /// When the entry was stored; freshness is measured from here
    pub updated_at: DateTime<Utc>,
    pub items: Vec<ForecastRow>,
}

impl ForecastCacheEntry {
    #[must_use]
    pub fn new(zone_id: String, name: String, items: Vec<ForecastRow>) -> Self {
        Self {
            zone_id,
            name,
            updated_at: Utc::now(),
            items,
        }
    }
}
