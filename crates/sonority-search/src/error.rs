//! Error types for the recommendation engine.

use thiserror::Error;

/// Errors that can occur while fitting or querying the feature space.
///
/// Expected edge cases (empty catalog, unknown seeds, incomplete feature
/// vectors) are not errors: the recommender answers them with an empty list.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Reading the catalog from its store failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] sonority_core::Error),

    /// A scaler was fitted on zero rows.
    #[error("cannot fit a scaler on an empty catalog")]
    EmptyCatalog,

    /// Catalog data contains NaN or an infinity.
    #[error("non-finite value for {feature} in catalog row {row}")]
    NonFinite { row: usize, feature: &'static str },
}

/// Convenience alias for recommendation results.
pub type SearchResult<T> = std::result::Result<T, SearchError>;
