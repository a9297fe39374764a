//! Weather provider (OpenWeatherMap current-weather response shape).

use async_trait::async_trait;
use parkpal_common::{Coordinates, ParkPalError, ParkPalResult, Units, WeatherSnapshot};
use serde::Deserialize;
use tracing::instrument;

use crate::client::HttpClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Source of current conditions for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_weather(&self, coords: Coordinates, units: Units)
        -> ParkPalResult<WeatherSnapshot>;
}

/// Response from the current-weather endpoint. Only the fields we read.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    main: Option<MainBlock>,
    #[serde(default)]
    weather: Option<Vec<Option<Condition>>>,
    #[serde(default)]
    sys: Option<SysBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    #[serde(default)]
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SysBlock {
    #[serde(default)]
    sunrise: Option<i64>,
    #[serde(default)]
    sunset: Option<i64>,
}

impl From<CurrentWeather> for WeatherSnapshot {
    fn from(w: CurrentWeather) -> Self {
        let temp = w
            .main
            .and_then(|m| m.temp)
            .map(|t| (t + 0.5).floor() as i64)
            .unwrap_or(0);
        let desc = w
            .weather
            .and_then(|conditions| conditions.into_iter().next().flatten())
            .and_then(|c| c.description)
            .unwrap_or_default()
            .to_lowercase();
        let (sunrise, sunset) = w.sys.map(|s| (s.sunrise, s.sunset)).unwrap_or((None, None));

        WeatherSnapshot {
            temp,
            desc,
            sunrise,
            sunset,
        }
    }
}

/// Parse a current-weather body into a snapshot.
pub fn parse_current_weather(body: &[u8]) -> ParkPalResult<WeatherSnapshot> {
    serde_json::from_slice::<CurrentWeather>(body)
        .map(WeatherSnapshot::from)
        .map_err(|e| ParkPalError::MalformedResponse(format!("weather: {}", e)))
}

/// OpenWeatherMap client.
pub struct OpenWeatherClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self), fields(lat = coords.lat, lon = coords.lon))]
    async fn fetch_weather(
        &self,
        coords: Coordinates,
        units: Units,
    ) -> ParkPalResult<WeatherSnapshot> {
        let query = [
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", units.as_str().to_string()),
            ("appid", self.api_key.clone()),
        ];

        let body = self.http.get_bytes(&self.base_url, &query).await?;
        parse_current_weather(&body)
    }
}
