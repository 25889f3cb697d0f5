//! Free-text location resolution.
//!
//! A query is geocoded verbatim first. When that yields nothing, a fixed list
//! of rewrite strategies is tried in order and the first rewrite that geocodes
//! wins. Strategies never combine: each one rewrites the original query.

use std::fmt::Debug;

use tracing::{debug, info, warn};

use crate::{
    error::{ProviderError, QueryError},
    model::GeocodeMatch,
    provider::WeatherProvider,
};

/// Only the provider's top-ranked result is ever considered.
const GEOCODE_LIMIT: u8 = 1;

/// Country spellings users type, mapped to the code the geocoder expects.
const COUNTRY_SYNONYMS: &[(&str, &str)] = &[("UK", "GB")];

/// US states plus DC.
const US_STATE_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY", "DC",
];

/// One way of turning the user's query into a geocoding request.
pub trait QueryStrategy: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// The query to geocode, or `None` when the strategy does not apply.
    fn rewrite(&self, query: &str) -> Option<String>;
}

/// The query as typed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl QueryStrategy for Direct {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn rewrite(&self, query: &str) -> Option<String> {
        Some(query.to_string())
    }
}

/// `"London, UK"` → `"London, GB"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountrySynonym;

impl QueryStrategy for CountrySynonym {
    fn name(&self) -> &'static str {
        "country-synonym"
    }

    fn rewrite(&self, query: &str) -> Option<String> {
        let parts = comma_parts(query);
        let (last, head) = parts.split_last()?;
        if head.is_empty() {
            return None;
        }

        let suffix = normalize_suffix(last);
        let (_, canonical) = COUNTRY_SYNONYMS.iter().find(|(synonym, _)| *synonym == suffix)?;

        Some(format!("{}, {canonical}", head.join(", ")))
    }
}

/// `"Boston, MA"` → `"Boston, MA, US"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsStateSuffix;

impl QueryStrategy for UsStateSuffix {
    fn name(&self) -> &'static str {
        "us-state"
    }

    fn rewrite(&self, query: &str) -> Option<String> {
        let parts = comma_parts(query);
        if parts.len() < 2 {
            return None;
        }

        let suffix = normalize_suffix(parts.last()?);
        US_STATE_CODES.contains(&suffix.as_str()).then(|| format!("{query}, US"))
    }
}

fn comma_parts(query: &str) -> Vec<&str> {
    query.split(',').map(str::trim).collect()
}

fn normalize_suffix(part: &str) -> String {
    part.to_uppercase().replace('.', "")
}

#[derive(Debug)]
pub struct LocationResolver {
    strategies: Vec<Box<dyn QueryStrategy>>,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(vec![Box::new(Direct), Box::new(CountrySynonym), Box::new(UsStateSuffix)])
    }
}

impl LocationResolver {
    /// Strategies are tried in the given order.
    pub fn new(strategies: Vec<Box<dyn QueryStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve `query` to the first geocode match any strategy produces.
    ///
    /// Provider errors only fail the attempt that raised them; if nothing
    /// matches, the last such error is kept on the `NotFound` for context.
    pub async fn resolve(
        &self,
        provider: &dyn WeatherProvider,
        query: &str,
    ) -> Result<GeocodeMatch, QueryError> {
        let mut attempts = 0;
        let mut last_provider_error: Option<ProviderError> = None;

        for strategy in &self.strategies {
            let Some(candidate) = strategy.rewrite(query) else {
                debug!(query, strategy = strategy.name(), "strategy not applicable");
                continue;
            };

            attempts += 1;
            info!(query, strategy = strategy.name(), candidate = %candidate, "geocoding attempt");

            match provider.geocode(&candidate, GEOCODE_LIMIT).await {
                Ok(matches) => {
                    if let Some(found) = matches.into_iter().next() {
                        info!(query, strategy = strategy.name(), "geocode succeeded");
                        return Ok(found);
                    }
                }
                Err(err) => {
                    warn!(query, strategy = strategy.name(), candidate = %candidate, error = %err,
                        "geocoding attempt failed");
                    last_provider_error = Some(err);
                }
            }
        }

        warn!(query, attempts, "all geocoding attempts failed");
        Err(QueryError::NotFound { query: query.to_string(), attempts, last_provider_error })
    }
}
