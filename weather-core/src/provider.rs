use crate::{
    Config, GeocodeMatch, WeatherObservation, error::ProviderError,
    provider::openweather::OpenWeatherProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Remote weather service: geocoding plus current conditions by coordinates.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Look up `query`, returning at most `limit` matches, best first.
    ///
    /// No match is an empty vector, not an error.
    async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<GeocodeMatch>, ProviderError>;

    /// Current conditions at the given coordinates, temperature in Kelvin.
    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherObservation, ProviderError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is fatal for the whole batch, so it is reported here,
/// before any query runs.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_with_api_key(config, config.resolved_api_key())
}

fn provider_with_api_key(
    config: &Config,
    api_key: Option<String>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "Server configuration error: no OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider = OpenWeatherProvider::new(&config.openweather, api_key)
        .context("Failed to build OpenWeather HTTP client")?;

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let cfg = Config::default();

        let err = provider_with_api_key(&cfg, None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `weather configure`"));
    }

    #[test]
    fn explicit_api_key_builds_provider() {
        let cfg = Config::default();

        assert!(provider_with_api_key(&cfg, Some("KEY".to_string())).is_ok());
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
