use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-ranked geocoding result for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub country_code: Option<String>,
    pub state_name: Option<String>,
    pub resolved_city_name: Option<String>,
}

/// Location fields as reported by the weather endpoint itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedLocation {
    pub name: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
}

/// Current conditions as received from the provider.
///
/// Every measurement is optional: the provider payload is not trusted to be
/// complete, and completeness is decided by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_kelvin: Option<f64>,
    pub humidity_pct: Option<u8>,
    pub wind_speed: Option<f64>,
    pub description: Option<String>,
    pub location: Option<ObservedLocation>,
}

/// Observation whose naming fields come from the geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedObservation {
    pub temperature_kelvin: Option<f64>,
    pub humidity_pct: Option<u8>,
    pub wind_speed: Option<f64>,
    pub description: Option<String>,
    pub city_name: Option<String>,
    pub country_code: Option<String>,
    pub state_name: Option<String>,
}

impl EnrichedObservation {
    /// Merge a provider observation with the geocode match it was fetched for.
    ///
    /// Naming always comes from `geocode`, even when the provider reported its
    /// own location; the provider's location block is dropped.
    pub fn overlay(observation: WeatherObservation, geocode: &GeocodeMatch) -> Self {
        Self {
            temperature_kelvin: observation.temperature_kelvin,
            humidity_pct: observation.humidity_pct,
            wind_speed: observation.wind_speed,
            description: observation.description,
            city_name: geocode.resolved_city_name.clone(),
            country_code: geocode.country_code.clone(),
            state_name: geocode.state_name.clone(),
        }
    }

    /// City name, ignoring blank values.
    pub fn city(&self) -> Option<&str> {
        self.city_name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

/// Successfully processed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub original_input: String,
    pub city_name: String,
    pub country_code: Option<String>,
    pub state_name: Option<String>,
    pub weather_description: String,
    pub temperature_kelvin: f64,
    pub temperature_celsius: f64,
    pub temperature_fahrenheit: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub comfort_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Provider,
    IncompleteData,
    Internal,
}

/// Query that could not be turned into a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub original_input: String,
    pub kind: FailureKind,
    pub error: String,
    pub city_name: Option<String>,
    pub country_code: Option<String>,
    pub state_name: Option<String>,
}

/// Outcome for one input query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WeatherResult {
    Success(WeatherReport),
    Failure(QueryFailure),
}

impl WeatherResult {
    pub fn original_input(&self) -> &str {
        match self {
            WeatherResult::Success(report) => &report.original_input,
            WeatherResult::Failure(failure) => &failure.original_input,
        }
    }

    pub fn as_success(&self) -> Option<&WeatherReport> {
        match self {
            WeatherResult::Success(report) => Some(report),
            WeatherResult::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WeatherResult::Success(_))
    }
}

/// Stored history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: i64,
    pub city_name: String,
    pub temperature_kelvin: f64,
    pub temperature_celsius: f64,
    pub temperature_fahrenheit: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub weather_description: String,
    pub comfort_index: f64,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boston() -> GeocodeMatch {
        GeocodeMatch {
            latitude: 42.36,
            longitude: -71.06,
            country_code: Some("US".into()),
            state_name: Some("Massachusetts".into()),
            resolved_city_name: Some("Boston".into()),
        }
    }

    #[test]
    fn overlay_prefers_geocode_naming() {
        let observation = WeatherObservation {
            temperature_kelvin: Some(290.0),
            humidity_pct: Some(40),
            wind_speed: Some(3.0),
            description: Some("clear sky".into()),
            location: Some(ObservedLocation {
                name: Some("Downtown".into()),
                country: Some("XX".into()),
                state: None,
            }),
        };

        let enriched = EnrichedObservation::overlay(observation, &boston());

        assert_eq!(enriched.city_name.as_deref(), Some("Boston"));
        assert_eq!(enriched.country_code.as_deref(), Some("US"));
        assert_eq!(enriched.state_name.as_deref(), Some("Massachusetts"));
        assert_eq!(enriched.temperature_kelvin, Some(290.0));
    }

    #[test]
    fn overlay_without_provider_location() {
        let enriched = EnrichedObservation::overlay(WeatherObservation::default(), &boston());
        assert_eq!(enriched.city(), Some("Boston"));
    }

    #[test]
    fn overlay_clears_provider_state_when_geocode_has_none() {
        let mut geocode = boston();
        geocode.state_name = None;
        let observation = WeatherObservation {
            location: Some(ObservedLocation { state: Some("Somewhere".into()), ..Default::default() }),
            ..Default::default()
        };

        let enriched = EnrichedObservation::overlay(observation, &geocode);
        assert_eq!(enriched.state_name, None);
    }

    #[test]
    fn blank_city_is_missing() {
        let mut geocode = boston();
        geocode.resolved_city_name = Some("  ".into());
        let enriched = EnrichedObservation::overlay(WeatherObservation::default(), &geocode);
        assert_eq!(enriched.city(), None);
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let failure = WeatherResult::Failure(QueryFailure {
            original_input: "Nowhere123".into(),
            kind: FailureKind::NotFound,
            error: "not found".into(),
            city_name: None,
            country_code: None,
            state_name: None,
        });

        let json = serde_json::to_value(&failure).expect("serializes");
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "not_found");
        assert_eq!(json["original_input"], "Nowhere123");
    }
}
