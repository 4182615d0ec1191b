//! Error types for seeding, translation, and enrichment.

use thiserror::Error;

/// Errors that can occur while looking up external track metadata.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// An HTTP request to an external source failed.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// The external source returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// The requested entity was not found.
    #[error("not found: {entity} at {source_name}")]
    NotFound { entity: String, source_name: String },

    /// A response from an external source could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the catalog store.
    #[error("database error: {0}")]
    Database(#[from] sonority_core::Error),
}

impl EnrichError {
    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::RateLimited { .. })
    }

    /// Returns `true` when the error indicates the entity was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias for enrichment results.
pub type EnrichResult<T> = std::result::Result<T, EnrichError>;

/// Errors from the text-to-features translator.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// No API key was configured for the language model.
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: &'static str },

    /// The model endpoint answered with a non-success status.
    #[error("HTTP {status} from {provider}: {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The model answered but no candidate text was present.
    #[error("{provider} returned no candidates")]
    EmptyResponse { provider: &'static str },

    /// The candidate text was not a valid feature object.
    #[error("could not parse features from {provider}: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl TranslateError {
    /// Server errors, rate limiting, and timeouts are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Convenience alias for translation results.
pub type TranslateResult<T> = std::result::Result<T, TranslateError>;

/// Errors from a free-text recommendation request.
#[derive(Debug, Error)]
pub enum MoodError {
    #[error("translation failed: {0}")]
    Translate(#[from] TranslateError),

    #[error("recommendation failed: {0}")]
    Search(#[from] sonority_search::SearchError),
}

/// Errors that abort catalog seeding.
///
/// Individual malformed rows do not abort seeding; they are counted in the
/// [`SeedReport`](crate::seed::SeedReport).
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sonority_core::Error),
}

/// Convenience alias for seeding results.
pub type SeedResult<T> = std::result::Result<T, SeedError>;
