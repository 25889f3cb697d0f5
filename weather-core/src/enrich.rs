use tracing::debug;

use crate::{
    error::ProviderError,
    model::{EnrichedObservation, GeocodeMatch},
    provider::WeatherProvider,
};

/// Fetch current weather for a resolved location and apply its naming.
pub async fn enrich(
    provider: &dyn WeatherProvider,
    geocode: &GeocodeMatch,
) -> Result<EnrichedObservation, ProviderError> {
    let observation = provider.current_weather(geocode.latitude, geocode.longitude).await?;

    if let Some(reported) = &observation.location {
        debug!(
            provider_name = ?reported.name,
            provider_country = ?reported.country,
            geocode_name = ?geocode.resolved_city_name,
            "replacing provider location with geocode naming"
        );
    }

    Ok(EnrichedObservation::overlay(observation, geocode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObservedLocation;
    use crate::testing::{ScriptedProvider, geo, observation};

    #[tokio::test]
    async fn geocode_names_win() {
        let mut reported = observation(Some(290.0), Some(60), Some(2.5));
        reported.location = Some(ObservedLocation {
            name: Some("Cambridge".into()),
            country: Some("GB".into()),
            state: None,
        });
        let provider = ScriptedProvider::default().weather(42.36, reported);

        let enriched = enrich(&provider, &geo("Boston", 42.36, "US", Some("Massachusetts")))
            .await
            .expect("enriched");

        assert_eq!(enriched.city_name.as_deref(), Some("Boston"));
        assert_eq!(enriched.country_code.as_deref(), Some("US"));
        assert_eq!(enriched.state_name.as_deref(), Some("Massachusetts"));
        assert_eq!(enriched.humidity_pct, Some(60));
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let provider = ScriptedProvider::default().weather_failing(10.0);

        let err = enrich(&provider, &geo("Somewhere", 10.0, "XX", None)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
    }
}
