//! Per-feature min-max scaling.
//!
//! The scaler is fitted on the whole catalog and then applied unchanged to
//! catalog rows, seed vectors, and supplied query vectors, so all of them
//! live in the same normalized space.

use sonority_core::model::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

use crate::error::{SearchError, SearchResult};

/// Maps each feature linearly onto [0, 1] using the catalog's min and max.
///
/// A feature whose min equals its max carries no information; every value
/// of that feature transforms to `0.0`. Values outside the fitted range are
/// not clipped, so a query vector may land outside [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: FeatureVector,
    max: FeatureVector,
}

impl MinMaxScaler {
    /// Learn per-feature bounds from the catalog rows.
    ///
    /// # Errors
    /// [`SearchError::EmptyCatalog`] for zero rows and
    /// [`SearchError::NonFinite`] if any value is NaN or infinite.
    pub fn fit(rows: &[FeatureVector]) -> SearchResult<Self> {
        if rows.is_empty() {
            return Err(SearchError::EmptyCatalog);
        }

        let mut min = [f64::INFINITY; FEATURE_COUNT];
        let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
        for (row, values) in rows.iter().enumerate() {
            for (i, &v) in values.iter().enumerate() {
                if !v.is_finite() {
                    return Err(SearchError::NonFinite {
                        row,
                        feature: FEATURE_NAMES[i],
                    });
                }
                min[i] = min[i].min(v);
                max[i] = max[i].max(v);
            }
        }

        Ok(Self { min, max })
    }

    /// Scale a single vector.
    #[must_use]
    pub fn transform(&self, values: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, v) in values.iter().enumerate() {
            let range = self.max[i] - self.min[i];
            out[i] = if range > 0.0 {
                (v - self.min[i]) / range
            } else {
                0.0
            };
        }
        out
    }

    /// Scale every row.
    #[must_use]
    pub fn transform_all(&self, rows: &[FeatureVector]) -> Vec<FeatureVector> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    #[must_use]
    pub const fn min(&self) -> &FeatureVector {
        &self.min
    }

    #[must_use]
    pub const fn max(&self) -> &FeatureVector {
        &self.max
    }

    /// Whether feature `i` had zero variance in the fitted catalog.
    #[must_use]
    pub fn is_degenerate(&self, i: usize) -> bool {
        self.max[i] <= self.min[i]
    }
}
