//! HTTP API surface
//!
//! The router exposes the weather bundle, the recommendation context and
//! the calendar snapshot. Every weather path degrades gracefully; only the
//! calendar save reports failure to the caller.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::calendar::{CalendarEventMap, CalendarStore};
use crate::error::OutfitAiError;
use crate::location_resolver::RequestMeta;
use crate::prompt::{Period, build_prompt_context};
use crate::weather::{WeatherBundle, WeatherService};
use crate::models::Location;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
    pub calendar: Arc<CalendarStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Wardrobe items selected by the client; passed through to the model
    /// caller untouched
    #[serde(default)]
    pub items: Option<Value>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    /// Optional inclusive date range; defaults to today (KST)
    #[serde(default)]
    pub period: Option<Period>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub location: Location,
    pub zone_id: String,
    /// Rendered weather/calendar context block for the model
    pub context: String,
    /// Echo of the selected items for the model caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/recommend", post(recommend))
        .route("/calendar", get(get_calendar).put(save_calendar))
        .with_state(state)
}

fn request_meta(
    lat: Option<String>,
    lon: Option<String>,
    headers: &HeaderMap,
    addr: SocketAddr,
) -> RequestMeta {
    RequestMeta {
        lat,
        lon,
        forwarded_for: headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        remote_addr: Some(addr.ip()),
    }
}

/// Weather bundle for the requester's location (explicit coordinates or
/// client IP). Never fails; degraded data comes back marked as such.
async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<WeatherBundle> {
    let meta = request_meta(query.lat, query.lon, &headers, addr);
    Json(state.weather.weather_for_request(&meta).await)
}

/// Assemble the recommendation context: weather bundle plus one calendar
/// snapshot, rendered over the requested period.
async fn recommend(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<RecommendRequest>,
) -> Json<RecommendResponse> {
    let meta = request_meta(request.lat, request.lon, &headers, addr);
    let bundle = state.weather.weather_for_request(&meta).await;

    // One snapshot per request, reused across every day in the range.
    let events = state.calendar.load_or_empty().await;
    let context = build_prompt_context(&bundle, &events, request.period);

    Json(RecommendResponse {
        location: bundle.location,
        zone_id: bundle.zone_id,
        context,
        items: request.items,
    })
}

/// Stored calendar snapshot; degraded reads return an empty map.
async fn get_calendar(State(state): State<AppState>) -> Json<CalendarEventMap> {
    Json(state.calendar.load_or_empty().await)
}

/// Overwrite the calendar snapshot. This is the one path where a storage
/// failure reaches the end user.
async fn save_calendar(
    State(state): State<AppState>,
    Json(map): Json<CalendarEventMap>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.calendar.save(&map).await.map_err(|e| {
        error!("Calendar save failed: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            OutfitAiError::storage(e.to_string()).user_message(),
        )
    })?;
    Ok(StatusCode::OK)
}
