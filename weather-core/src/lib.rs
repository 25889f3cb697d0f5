//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider (geocoding and current conditions)
//! - Location resolution with fallback rewrites for ambiguous queries
//! - The batch pipeline turning free-text queries into weather results
//! - SQLite-backed history of successful results
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod enrich;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{ProviderError, QueryError, StoreError};
pub use model::{
    EnrichedObservation, FailureKind, GeocodeMatch, PersistedRecord, QueryFailure,
    WeatherObservation, WeatherReport, WeatherResult,
};
pub use pipeline::{BatchPipeline, BatchSummary};
pub use provider::{WeatherProvider, provider_from_config};
pub use resolver::LocationResolver;
pub use store::{HISTORY_LIMIT, RecordStore, SqliteRecordStore};
