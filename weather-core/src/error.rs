//! Error types for provider calls, per-query processing and storage.

use thiserror::Error;

use crate::model::FailureKind;

/// Failure talking to the weather service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Location fields recovered before a query failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialLocation {
    pub city_name: Option<String>,
    pub country_code: Option<String>,
    pub state_name: Option<String>,
}

/// Why a single query produced no report.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(
        "Could not fetch weather data for '{query}'. Location may be invalid, not found, \
         or an API/network error occurred."
    )]
    NotFound {
        query: String,
        attempts: usize,
        last_provider_error: Option<ProviderError>,
    },

    #[error("Weather service request failed for '{query}': {source}")]
    Provider {
        query: String,
        #[source]
        source: ProviderError,
    },

    #[error("Incomplete data received from the weather service for '{query}' (missing {missing}).")]
    IncompleteData {
        query: String,
        missing: String,
        partial: PartialLocation,
    },

    #[error(
        "An internal error occurred while processing the weather data for '{query}': {message}"
    )]
    Internal { query: String, message: String },
}

impl QueryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            QueryError::NotFound { .. } => FailureKind::NotFound,
            QueryError::Provider { .. } => FailureKind::Provider,
            QueryError::IncompleteData { .. } => FailureKind::IncompleteData,
            QueryError::Internal { .. } => FailureKind::Internal,
        }
    }

    pub fn partial_location(&self) -> PartialLocation {
        match self {
            QueryError::IncompleteData { partial, .. } => partial.clone(),
            _ => PartialLocation::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database location {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
