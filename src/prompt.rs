//! Prompt context assembly
//!
//! Walks a date range, merges per-day forecast rows with per-day calendar
//! events, and renders the natural-language context block fed to the
//! recommendation model. Must always produce some context, even when both
//! the forecast and the calendar are empty.

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarEventMap;
use crate::weather::{WeatherBundle, kma};

/// Rendered when a day has no calendar entries
pub const NO_EVENTS_SENTINEL: &str = "일정 없음";

/// An inclusive date range for the context block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Single day period
    #[must_use]
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Today in fixed UTC+9 local time (DST-agnostic by design)
    #[must_use]
    pub fn today_kst() -> Self {
        Self::single(Utc::now().with_timezone(&kma::kst()).date_naive())
    }
}

/// Render the full context block for a weather bundle, one calendar
/// snapshot and an optional period (default: today in KST).
///
/// Tolerates an empty calendar map, an empty forecast list and single-day
/// ranges; those are common cases, not edge cases.
#[must_use]
pub fn build_prompt_context(
    bundle: &WeatherBundle,
    events: &CalendarEventMap,
    period: Option<Period>,
) -> String {
    let period = period.unwrap_or_else(Period::today_kst);

    let mut blocks = vec![format!("위치: {}", bundle.region_name)];

    let mut day = period.start;
    while day <= period.end {
        blocks.push(render_day(bundle, events, day));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    blocks.join("\n\n")
}

fn render_day(bundle: &WeatherBundle, events: &CalendarEventMap, day: NaiveDate) -> String {
    let date_key = day.format("%Y-%m-%d").to_string();
    let weather_line = render_weather(bundle, day);
    let events_line = render_events(events, &date_key);

    format!(
        "{} ({})\n- 날씨: {}\n- 일정: {}",
        date_key,
        korean_weekday(day.weekday()),
        weather_line,
        events_line
    )
}

/// Weather line for a day: matched forecast rows win; otherwise the
/// seasonal average for the day's calendar month.
fn render_weather(bundle: &WeatherBundle, day: NaiveDate) -> String {
    let compact = day.format("%Y%m%d").to_string();
    let rows = bundle.rows_for_compact_date(&compact);

    if rows.is_empty() {
        return seasonal_description(day.month()).to_string();
    }

    // The first matching row's free text is representative for the day.
    let summary = rows[0].summary.clone();
    let temperatures: Vec<f64> = rows.iter().filter_map(|row| row.temperature_value()).collect();

    match temperature_range(&temperatures) {
        Some((min, max)) => format!("기온 {min:.0}°C ~ {max:.0}°C, {summary}"),
        None => summary,
    }
}

fn temperature_range(temperatures: &[f64]) -> Option<(f64, f64)> {
    if temperatures.is_empty() {
        return None;
    }
    let min = temperatures.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temperatures
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

fn render_events(events: &CalendarEventMap, date_key: &str) -> String {
    match events.get(date_key) {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(|entry| entry.title.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => NO_EVENTS_SENTINEL.to_string(),
    }
}

/// Seasonal averages for days beyond the forecast horizon.
/// Northern-hemisphere Korean seasons, keyed by calendar month.
#[must_use]
pub fn seasonal_description(month: u32) -> &'static str {
    match month {
        3..=5 => "평년 기온 5°C ~ 15°C 안팎의 봄 날씨가 예상됩니다",
        6..=8 => "평년 기온 22°C ~ 30°C 안팎의 덥고 습한 여름 날씨가 예상됩니다",
        9..=11 => "평년 기온 10°C ~ 20°C 안팎의 선선한 가을 날씨가 예상됩니다",
        _ => "평년 기온 -5°C ~ 5°C 안팎의 추운 겨울 날씨가 예상됩니다",
    }
}

fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}
