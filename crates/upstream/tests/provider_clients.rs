//! Provider clients against a local mock upstream.

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use parkpal_common::{Coordinates, ParkConfig, ParkPalError, Units};
use std::collections::HashMap;
use std::time::Duration;
use test_utils::{open_weather, queue_times, MockServer};
use upstream::{
    HttpClient, OpenWeatherClient, QueueTimesClient, RideSource, UpstreamConfig, WeatherSource,
};

fn client(timeout: Duration) -> HttpClient {
    HttpClient::new(&UpstreamConfig {
        timeout,
        user_agent: "ParkPal/1.0".to_string(),
    })
    .unwrap()
}

fn park_at(server: &MockServer, id: i64) -> ParkConfig {
    ParkConfig {
        id,
        name: format!("Park {}", id),
        provider: "queue-times".to_string(),
        url: server.url(&format!("/parks/{}/queue_times.json", id)),
    }
}

async fn ride_server() -> MockServer {
    let router = Router::new()
        .route("/parks/6/queue_times.json", get(|| async { queue_times::SECTIONED }))
        .route(
            "/parks/7/queue_times.json",
            get(|| async { queue_times::FLAT_WITH_EMPTY_LANDS }),
        )
        .route("/parks/8/queue_times.json", get(|| async { queue_times::OVERLAPPING }))
        .route("/parks/9/queue_times.json", get(|| async { queue_times::NO_RIDES }))
        .route(
            "/parks/10/queue_times.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/parks/11/queue_times.json",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                queue_times::SECTIONED
            }),
        );
    MockServer::start(router).await
}

#[tokio::test]
async fn test_sectioned_feed_is_flattened() {
    let server = ride_server().await;
    let rides = QueueTimesClient::new(client(Duration::from_secs(2)));

    let feed = rides.fetch_rides(&park_at(&server, 6)).await.unwrap();
    let ids: Vec<i64> = feed.rides.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![138, 1190, 284]);
    assert!(!feed.rides[2].is_open);
}

#[tokio::test]
async fn test_flat_feed_with_empty_sections() {
    let server = ride_server().await;
    let rides = QueueTimesClient::new(client(Duration::from_secs(2)));

    let feed = rides.fetch_rides(&park_at(&server, 7)).await.unwrap();
    assert_eq!(feed.rides.len(), 2);
    assert_eq!(feed.rides[0].name, "Soaring: Fantastic Flight");
    assert_eq!(feed.rides[0].wait_time, 65);
}

#[tokio::test]
async fn test_overlapping_shapes_keep_sectioned_entry() {
    let server = ride_server().await;
    let rides = QueueTimesClient::new(client(Duration::from_secs(2)));

    let feed = rides.fetch_rides(&park_at(&server, 8)).await.unwrap();
    assert_eq!(feed.park_name.as_deref(), Some("Magic Kingdom Park"));
    assert_eq!(feed.rides.len(), 2);
    assert_eq!(feed.rides[0].name, "Space Mountain");
    assert_eq!(feed.rides[0].wait_time, 45);
    assert_eq!(feed.rides[1].id, 139);
}

#[tokio::test]
async fn test_ride_failures_are_classified() {
    let server = ride_server().await;
    let rides = QueueTimesClient::new(client(Duration::from_millis(100)));

    let err = rides.fetch_rides(&park_at(&server, 9)).await.unwrap_err();
    assert!(matches!(err, ParkPalError::MalformedResponse(_)));
    assert_eq!(err.token_reason(), "malformed");

    let err = rides.fetch_rides(&park_at(&server, 10)).await.unwrap_err();
    assert!(matches!(err, ParkPalError::UpstreamStatus(500)));
    assert_eq!(err.token_reason(), "HTTP_500");

    let err = rides.fetch_rides(&park_at(&server, 11)).await.unwrap_err();
    assert!(matches!(err, ParkPalError::Timeout));
    assert_eq!(err.token_reason(), "timeout");
}

#[tokio::test]
async fn test_weather_request_and_parse() {
    let router = Router::new().route(
        "/weather",
        get(
            |Query(params): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                let agent = headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                let ok = params.get("units").map(String::as_str) == Some("imperial")
                    && params.get("appid").map(String::as_str) == Some("test-key")
                    && params.contains_key("lat")
                    && params.contains_key("lon")
                    && agent == "ParkPal/1.0";
                if ok {
                    (StatusCode::OK, open_weather::CLEAR)
                } else {
                    (StatusCode::BAD_REQUEST, "{}")
                }
            },
        ),
    );
    let server = MockServer::start(router).await;

    let weather = OpenWeatherClient::new(
        client(Duration::from_secs(2)),
        server.url("/weather"),
        "test-key",
    );
    let snapshot = weather
        .fetch_weather(
            Coordinates {
                lat: 28.3772,
                lon: -81.5707,
            },
            Units::Imperial,
        )
        .await
        .unwrap();

    assert_eq!(snapshot.temp, 87);
    assert_eq!(snapshot.desc, "clear sky");
    assert_eq!(snapshot.sunrise, Some(1_717_236_000));
    assert!(snapshot.is_usable());
}

#[tokio::test]
async fn test_weather_unauthorized_is_status_error() {
    let router = Router::new().route(
        "/weather",
        get(|| async { (StatusCode::UNAUTHORIZED, r#"{"cod":401}"#) }),
    );
    let server = MockServer::start(router).await;

    let weather = OpenWeatherClient::new(client(Duration::from_secs(2)), server.url("/weather"), "");
    let err = weather
        .fetch_weather(Coordinates { lat: 0.0, lon: 0.0 }, Units::Metric)
        .await
        .unwrap_err();
    assert_eq!(err.token_reason(), "HTTP_401");
}
