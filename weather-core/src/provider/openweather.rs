use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::OpenWeatherConfig,
    error::ProviderError,
    model::{GeocodeMatch, ObservedLocation, WeatherObservation},
};

use super::WeatherProvider;

const GEOCODING: &str = "OpenWeather geocoding";
const CURRENT_WEATHER: &str = "OpenWeather current weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    geo_base_url: String,
    weather_base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(settings: &OpenWeatherConfig, api_key: String) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            geo_base_url: settings.geo_base_url.trim_end_matches('/').to_string(),
            weather_base_url: settings.weather_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| ProviderError::Http { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ProviderError::Http { endpoint, source })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ProviderError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeocodeEntry {
    name: Option<String>,
    lat: f64,
    lon: f64,
    country: Option<String>,
    state: Option<String>,
}

impl From<OwGeocodeEntry> for GeocodeMatch {
    fn from(entry: OwGeocodeEntry) -> Self {
        GeocodeMatch {
            latitude: entry.lat,
            longitude: entry.lon,
            country_code: entry.country,
            state_name: entry.state,
            resolved_city_name: entry.name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    sys: Option<OwSys>,
}

impl From<OwCurrentResponse> for WeatherObservation {
    fn from(parsed: OwCurrentResponse) -> Self {
        let description = parsed.weather.into_iter().next().and_then(|w| w.description);

        let location = match (parsed.name, parsed.sys) {
            (None, None) => None,
            (name, sys) => {
                let (country, state) = sys.map(|s| (s.country, s.state)).unwrap_or_default();
                Some(ObservedLocation { name, country, state })
            }
        };

        WeatherObservation {
            temperature_kelvin: parsed.main.temp,
            humidity_pct: parsed.main.humidity.and_then(humidity_pct),
            wind_speed: parsed.wind.speed,
            description,
            location,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<GeocodeMatch>, ProviderError> {
        let url = format!("{}/direct", self.geo_base_url);

        let entries: Vec<OwGeocodeEntry> = self
            .get_json(
                GEOCODING,
                &url,
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        debug!(query, matches = entries.len(), "geocoding response");

        Ok(entries.into_iter().take(usize::from(limit)).map(GeocodeMatch::from).collect())
    }

    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherObservation, ProviderError> {
        let url = format!("{}/weather", self.weather_base_url);

        let parsed: OwCurrentResponse = self
            .get_json(
                CURRENT_WEATHER,
                &url,
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("units", "standard".to_string()),
                ],
            )
            .await?;

        Ok(parsed.into())
    }
}

/// Whole-percent humidity; values that do not fit are treated as missing.
fn humidity_pct(value: f64) -> Option<u8> {
    let rounded = value.round();
    (rounded.is_finite() && (0.0..=f64::from(u8::MAX)).contains(&rounded)).then(|| rounded as u8)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
