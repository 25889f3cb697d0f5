//! In-memory provider used by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    error::ProviderError,
    model::{GeocodeMatch, WeatherObservation},
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
enum Reply<T> {
    Ok(T),
    Fail,
}

fn scripted_failure(endpoint: &'static str) -> ProviderError {
    ProviderError::Status { endpoint, status: 503, body: "scripted failure".to_string() }
}

/// Provider answering from fixed tables. Unknown queries geocode to nothing.
#[derive(Debug, Default, Clone)]
pub struct ScriptedProvider {
    geocode: HashMap<String, Reply<GeocodeMatch>>,
    weather: HashMap<u64, Reply<WeatherObservation>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn found(mut self, query: &str, found: GeocodeMatch) -> Self {
        self.geocode.insert(query.to_string(), Reply::Ok(found));
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.geocode.insert(query.to_string(), Reply::Fail);
        self
    }

    /// Weather keyed by latitude.
    pub fn weather(mut self, latitude: f64, observation: WeatherObservation) -> Self {
        self.weather.insert(latitude.to_bits(), Reply::Ok(observation));
        self
    }

    pub fn weather_failing(mut self, latitude: f64) -> Self {
        self.weather.insert(latitude.to_bits(), Reply::Fail);
        self
    }

    /// Queries passed to `geocode`, in call order.
    pub fn geocode_calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn geocode(&self, query: &str, _limit: u8) -> Result<Vec<GeocodeMatch>, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.to_string());
        }

        match self.geocode.get(query) {
            Some(Reply::Ok(found)) => Ok(vec![found.clone()]),
            Some(Reply::Fail) => Err(scripted_failure("geocoding")),
            None => Ok(Vec::new()),
        }
    }

    async fn current_weather(
        &self,
        latitude: f64,
        _longitude: f64,
    ) -> Result<WeatherObservation, ProviderError> {
        match self.weather.get(&latitude.to_bits()) {
            Some(Reply::Ok(observation)) => Ok(observation.clone()),
            Some(Reply::Fail) | None => Err(scripted_failure("current weather")),
        }
    }
}

pub fn geo(city: &str, latitude: f64, country: &str, state: Option<&str>) -> GeocodeMatch {
    GeocodeMatch {
        latitude,
        longitude: -latitude,
        country_code: Some(country.to_string()),
        state_name: state.map(str::to_string),
        resolved_city_name: Some(city.to_string()),
    }
}

pub fn observation(
    kelvin: Option<f64>,
    humidity: Option<u8>,
    wind: Option<f64>,
) -> WeatherObservation {
    WeatherObservation {
        temperature_kelvin: kelvin,
        humidity_pct: humidity,
        wind_speed: wind,
        description: Some("clear sky".to_string()),
        location: None,
    }
}
