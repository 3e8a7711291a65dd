//! End-to-end tests for the weather resolution and recommendation-context
//! pipeline, with all upstream HTTP dependencies mocked.

use std::io::Write;

use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use outfitai::calendar::{CalendarEntry, CalendarEventMap, CalendarStore};
use outfitai::config::OutfitAiConfig;
use outfitai::location_resolver::RequestMeta;
use outfitai::models::LocationSource;
use outfitai::prompt::{NO_EVENTS_SENTINEL, Period, build_prompt_context};
use outfitai::weather::WeatherService;

const FORECAST_TABLE: &str = r#"# REG_ID TM_FC TM_EF MOD NE STN C MAN_ID MAN_FC W1 T W2 TA ST SKY PREP WF
11B20601 202506010500 202506010900 A01 2 109 1 10 202506010500 S 8 SW 18 20 DB03 0 "맑음"
11B20601 202506010500 202506011500 A01 2 109 1 10 202506010500 S 8 SW 27 20 DB03 0 "맑음"
11B20601 202506010500 202506020900 A01 2 109 1 10 202506010500 W 8 NW 19 60 DB04 1 "흐리고 비"
"#;

fn write_region_directory(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("regions.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(
        serde_json::json!({
            "defaultZoneId": "11B10101",
            "cityToZone": { "수원": "11B20601" },
            "regionToZone": { "경기도": "11B00000" },
            "regions": [
                { "area": "수도권", "name": "서울", "zoneId": "11B10101" },
                { "area": "수도권", "name": "수원", "zoneId": "11B20601" }
            ]
        })
        .to_string()
        .as_bytes(),
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

fn config_for(server: &MockServer, regions_path: String) -> OutfitAiConfig {
    let mut config = OutfitAiConfig::default();
    config.weather.forecast_base_url = format!("{}/forecast", server.uri());
    config.weather.advisory_base_url = format!("{}/advisory", server.uri());
    config.weather.geolocation_base_url = format!("{}/geo", server.uri());
    config.regions.directory_path = regions_path;
    config
}

async fn mount_geo_success(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/geo/.*$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "country": "대한민국",
            "regionName": "경기도",
            "city": "수원",
            "lat": 37.2636,
            "lon": 127.0286,
            "query": "211.33.184.1"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn weather_bundle_resolves_city_and_caches_forecast() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Forecast body is served in the legacy Korean encoding; exactly one
    // upstream call is expected across the two requests below.
    let (euc_kr_body, _, _) = encoding_rs::EUC_KR.encode(FORECAST_TABLE);
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(euc_kr_body.into_owned(), "text/plain; charset=EUC-KR"),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Advisories are never cached: one fetch per request.
    Mock::given(method("GET"))
        .and(path("/advisory"))
        .respond_with(ResponseTemplate::new(200).set_body_string("W1 호우주의보"))
        .expect(2)
        .mount(&server)
        .await;

    mount_geo_success(&server).await;

    let config = config_for(&server, write_region_directory(&dir));
    let service = WeatherService::new(&config).unwrap();

    let meta = RequestMeta {
        forwarded_for: Some("211.33.184.1".to_string()),
        ..RequestMeta::default()
    };

    let bundle = service.weather_for_request(&meta).await;
    assert_eq!(bundle.location.source, LocationSource::GeoIp);
    assert_eq!(bundle.location.city, "수원");
    // The city-level map entry must win over the 경기도 region entry.
    assert_eq!(bundle.zone_id, "11B20601");
    assert_eq!(bundle.region_name, "수원");
    assert_eq!(bundle.forecast.items.len(), 3);
    assert_eq!(bundle.forecast.items[0].summary, "맑음");
    assert_eq!(bundle.advisory.as_deref(), Some("W1 호우주의보"));

    // Within the TTL the cached entry is served unchanged.
    let again = service.weather_for_request(&meta).await;
    assert_eq!(again.forecast.updated_at, bundle.forecast.updated_at);
}

#[tokio::test]
async fn selected_coordinates_skip_geolocation() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORECAST_TABLE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/advisory"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;
    // No geolocation mock is mounted: a lookup would 404 and degrade the
    // location to Default, failing the assertions below.

    let config = config_for(&server, write_region_directory(&dir));
    let service = WeatherService::new(&config).unwrap();

    let meta = RequestMeta {
        lat: Some("37.2636".to_string()),
        lon: Some("127.0286".to_string()),
        forwarded_for: Some("211.33.184.1".to_string()),
        ..RequestMeta::default()
    };

    let bundle = service.weather_for_request(&meta).await;
    assert_eq!(bundle.location.source, LocationSource::Selected);
    assert!(bundle.location.ip.is_none());
}

#[tokio::test]
async fn context_is_produced_under_total_upstream_failure() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Every upstream call fails; the pipeline must still produce a context.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server, write_region_directory(&dir));
    let service = WeatherService::new(&config).unwrap();

    let meta = RequestMeta {
        forwarded_for: Some("211.33.184.1".to_string()),
        ..RequestMeta::default()
    };
    let bundle = service.weather_for_request(&meta).await;

    assert_eq!(bundle.location.source, LocationSource::Default);
    assert_eq!(bundle.location.ip.as_deref(), Some("211.33.184.1"));
    assert!(bundle.forecast.items.is_empty());
    assert!(bundle.advisory.is_none());

    let store = CalendarStore::in_memory().unwrap();
    let mut map = CalendarEventMap::new();
    map.insert(
        "2025-06-01".to_string(),
        vec![CalendarEntry {
            id: "1".to_string(),
            title: "결혼식 참석".to_string(),
        }],
    );
    store.save(&map).await.unwrap();

    let events = store.load_or_empty().await;
    let period = Period {
        start: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end: chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
    };
    let context = build_prompt_context(&bundle, &events, Some(period));

    // Seasonal fallback for both days, events only on the first.
    assert!(context.contains("여름 날씨"));
    assert!(context.contains("결혼식 참석"));
    assert!(context.contains(NO_EVENTS_SENTINEL));
}

#[tokio::test]
async fn recommendation_context_merges_forecast_and_calendar() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORECAST_TABLE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/advisory"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;
    mount_geo_success(&server).await;

    let config = config_for(&server, write_region_directory(&dir));
    let service = WeatherService::new(&config).unwrap();

    let meta = RequestMeta {
        forwarded_for: Some("211.33.184.1".to_string()),
        ..RequestMeta::default()
    };
    let bundle = service.weather_for_request(&meta).await;

    let store = CalendarStore::in_memory().unwrap();
    let mut map = CalendarEventMap::new();
    map.insert(
        "2025-06-02".to_string(),
        vec![CalendarEntry {
            id: "7".to_string(),
            title: "출장".to_string(),
        }],
    );
    store.save(&map).await.unwrap();

    let events = store.load_or_empty().await;
    let period = Period {
        start: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end: chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
    };
    let context = build_prompt_context(&bundle, &events, Some(period));

    assert!(context.starts_with("위치: 수원"));
    assert!(context.contains("2025-06-01 (일요일)"));
    assert!(context.contains("기온 18°C ~ 27°C, 맑음"));
    assert!(context.contains("2025-06-02 (월요일)"));
    assert!(context.contains("기온 19°C ~ 19°C, 흐리고 비"));
    assert!(context.contains("출장"));
}
