//! Upstream weather-service protocol
//!
//! Issue-time schedule, forecast table fetch/decode and the live advisory
//! fetch. The upstream publishes at 8 fixed hours daily and serves either
//! UTF-8 or legacy EUC-KR bodies depending on the endpoint.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use reqwest::Client;

use crate::config::WeatherConfig;
use crate::models::{ForecastRow, forecast::parse_forecast_table};

/// Daily publication hours, local (KST) time
const ISSUE_HOURS: [u32; 8] = [2, 5, 8, 11, 14, 17, 20, 23];

/// KST is a fixed UTC+9 offset; the upstream schedule has no DST
pub(crate) fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("valid fixed offset")
}

/// Latest applicable issue-time stamp (YYYYMMDDHHMM) at or before `now`.
///
/// Rolls back to the previous day's 23:00 slot when called before the
/// first publication hour of the day.
#[must_use]
pub fn latest_issue_stamp(now: DateTime<FixedOffset>) -> String {
    let hour = now.hour();
    match ISSUE_HOURS.iter().rev().find(|&&h| h <= hour) {
        Some(&slot) => format!("{}{:02}00", now.format("%Y%m%d"), slot),
        None => {
            let yesterday = now - Duration::days(1);
            format!("{}2300", yesterday.format("%Y%m%d"))
        }
    }
}

/// Fetch and parse the forecast table for one zone.
///
/// Errors propagate to the caller; the cache layer is the one place that
/// absorbs them into an empty item list.
pub(crate) async fn fetch_forecast_rows(
    client: &Client,
    config: &WeatherConfig,
    zone_id: &str,
) -> Result<Vec<ForecastRow>> {
    let stamp = latest_issue_stamp(Utc::now().with_timezone(&kst()));
    let url = format!(
        "{}?reg={}&tmfc={}&disp=0&help=0&authKey={}",
        config.forecast_base_url,
        zone_id,
        stamp,
        config.auth_key.as_deref().unwrap_or_default()
    );

    let response = client
        .get(&url)
        .send()
        .await
        .context("Forecast request failed")?
        .error_for_status()
        .context("Forecast endpoint returned an error status")?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = response
        .bytes()
        .await
        .context("Failed to read forecast body")?;

    let body = decode_body(&bytes, content_type.as_deref());
    Ok(parse_forecast_table(&body))
}

/// Fetch current advisories. Never cached; advisories are time-sensitive.
/// The response body is passed through largely unparsed.
pub(crate) async fn fetch_advisories(client: &Client, config: &WeatherConfig) -> Result<String> {
    let stamp = latest_issue_stamp(Utc::now().with_timezone(&kst()));
    let url = format!(
        "{}?tmfc={}&disp=0&authKey={}",
        config.advisory_base_url,
        stamp,
        config.auth_key.as_deref().unwrap_or_default()
    );

    let response = client
        .get(&url)
        .send()
        .await
        .context("Advisory request failed")?
        .error_for_status()
        .context("Advisory endpoint returned an error status")?;

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = response
        .bytes()
        .await
        .context("Failed to read advisory body")?;

    Ok(decode_body(&bytes, content_type.as_deref()))
}

/// Decode a response body as UTF-8 or legacy EUC-KR per the declared
/// content-type charset.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let is_euc_kr = content_type
        .map(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.contains("euc-kr") || ct.contains("ks_c_5601")
        })
        .unwrap_or(false);

    if is_euc_kr {
        let (decoded, _, _) = encoding_rs::EUC_KR.decode(bytes);
        decoded.into_owned()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn kst_time(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        kst().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[rstest]
    #[case(2, 0, "202506010200")]
    #[case(4, 59, "202506010200")]
    #[case(5, 0, "202506010500")]
    #[case(13, 30, "202506011100")]
    #[case(23, 0, "202506012300")]
    #[case(23, 59, "202506012300")]
    fn test_latest_issue_stamp_picks_last_slot(
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] expected: &str,
    ) {
        let now = kst_time(2025, 6, 1, hour, minute);
        assert_eq!(latest_issue_stamp(now), expected);
    }

    #[test]
    fn test_issue_stamp_rolls_back_before_first_slot() {
        let now = kst_time(2025, 6, 1, 1, 30);
        assert_eq!(latest_issue_stamp(now), "202505312300");
    }

    #[test]
    fn test_issue_stamp_rollback_crosses_month_boundary() {
        let now = kst_time(2025, 3, 1, 0, 10);
        assert_eq!(latest_issue_stamp(now), "202502282300");
    }

    #[test]
    fn test_decode_body_euc_kr() {
        // "맑음" encoded as EUC-KR
        let bytes: &[u8] = &[0xB8, 0xBC, 0xC0, 0xBD];
        let decoded = decode_body(bytes, Some("text/plain; charset=EUC-KR"));
        assert_eq!(decoded, "맑음");
    }

    #[test]
    fn test_decode_body_defaults_to_utf8() {
        let decoded = decode_body("맑음".as_bytes(), Some("text/plain; charset=utf-8"));
        assert_eq!(decoded, "맑음");
        let decoded = decode_body("맑음".as_bytes(), None);
        assert_eq!(decoded, "맑음");
    }
}
