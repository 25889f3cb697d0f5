//! Batch processing: resolve, enrich and shape each query independently.

use tracing::{info, warn};

use crate::{
    enrich::enrich,
    error::{PartialLocation, QueryError},
    metrics::{comfort_index, kelvin_to_celsius_fahrenheit},
    model::{EnrichedObservation, QueryFailure, WeatherReport, WeatherResult},
    provider::WeatherProvider,
    resolver::LocationResolver,
};

const MISSING_DESCRIPTION: &str = "N/A";

#[derive(Debug)]
pub struct BatchPipeline {
    provider: Box<dyn WeatherProvider>,
    resolver: LocationResolver,
}

impl BatchPipeline {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self::with_resolver(provider, LocationResolver::default())
    }

    pub fn with_resolver(provider: Box<dyn WeatherProvider>, resolver: LocationResolver) -> Self {
        Self { provider, resolver }
    }

    /// One result per non-blank input, in input order.
    ///
    /// Queries run one after another; a failure is recorded for its own input
    /// and never stops the rest of the batch.
    pub async fn process_batch<S: AsRef<str>>(&self, queries: &[S]) -> Vec<WeatherResult> {
        let inputs = normalize_queries(queries);
        let mut results = Vec::with_capacity(inputs.len());

        for input in inputs {
            let outcome = self.process_query(input).await;
            results.push(into_result(input, outcome));
        }

        let summary = BatchSummary::from_results(&results);
        info!(succeeded = summary.succeeded, failed = summary.failed, "batch processed");

        results
    }

    /// Resolve, enrich and shape a single, already trimmed query.
    pub async fn process_query(&self, input: &str) -> Result<WeatherReport, QueryError> {
        let geocode = self.resolver.resolve(self.provider.as_ref(), input).await?;

        let enriched = enrich(self.provider.as_ref(), &geocode)
            .await
            .map_err(|source| QueryError::Provider { query: input.to_string(), source })?;

        build_report(input, enriched)
    }
}

/// Trim inputs and drop the blank ones.
pub fn normalize_queries<S: AsRef<str>>(queries: &[S]) -> Vec<&str> {
    queries.iter().map(|q| q.as_ref().trim()).filter(|q| !q.is_empty()).collect()
}

fn build_report(input: &str, enriched: EnrichedObservation) -> Result<WeatherReport, QueryError> {
    let city = enriched.city().map(str::to_string);

    let (Some(kelvin), Some(humidity), Some(wind), Some(city_name)) =
        (enriched.temperature_kelvin, enriched.humidity_pct, enriched.wind_speed, city)
    else {
        let missing = missing_fields(&enriched);
        warn!(input, missing = %missing, "incomplete weather data");
        return Err(QueryError::IncompleteData {
            query: input.to_string(),
            missing,
            partial: PartialLocation {
                city_name: enriched.city().map(str::to_string),
                country_code: enriched.country_code,
                state_name: enriched.state_name,
            },
        });
    };

    let internal = |message: &str| QueryError::Internal {
        query: input.to_string(),
        message: message.to_string(),
    };

    if !kelvin.is_finite() || !wind.is_finite() {
        return Err(internal("non-finite measurement"));
    }

    let (celsius, fahrenheit) = kelvin_to_celsius_fahrenheit(Some(kelvin));
    let (Some(celsius), Some(fahrenheit)) = (celsius, fahrenheit) else {
        return Err(internal("temperature conversion failed"));
    };
    let comfort = comfort_index(Some(celsius), Some(f64::from(humidity)), Some(wind))
        .filter(|value| value.is_finite())
        .ok_or_else(|| internal("comfort index could not be computed"))?;

    Ok(WeatherReport {
        original_input: input.to_string(),
        city_name,
        country_code: enriched.country_code,
        state_name: enriched.state_name,
        weather_description: enriched
            .description
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        temperature_kelvin: kelvin,
        temperature_celsius: celsius,
        temperature_fahrenheit: fahrenheit,
        humidity_pct: humidity,
        wind_speed: wind,
        comfort_index: comfort,
    })
}

fn missing_fields(enriched: &EnrichedObservation) -> String {
    let checks = [
        ("temperature", enriched.temperature_kelvin.is_none()),
        ("humidity", enriched.humidity_pct.is_none()),
        ("wind speed", enriched.wind_speed.is_none()),
        ("city name", enriched.city().is_none()),
    ];

    checks
        .iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn into_result(input: &str, outcome: Result<WeatherReport, QueryError>) -> WeatherResult {
    match outcome {
        Ok(report) => WeatherResult::Success(report),
        Err(err) => {
            warn!(input, kind = ?err.kind(), error = %err, "query failed");
            let partial = err.partial_location();
            WeatherResult::Failure(QueryFailure {
                original_input: input.to_string(),
                kind: err.kind(),
                error: err.to_string(),
                city_name: partial.city_name,
                country_code: partial.country_code,
                state_name: partial.state_name,
            })
        }
    }
}

/// Success/failure counts for a processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[WeatherResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self { succeeded, failed: results.len() - succeeded }
    }
}
