//! Seed- and feature-based recommendations.
//!
//! Each call loads the catalog, fits a [`MinMaxScaler`] and a [`BallTree`]
//! over it, resolves the request into one normalized query vector, and maps
//! the nearest rows back to tracks. Nothing survives the call.

use std::collections::HashSet;

use sonority_core::model::{FeatureVector, PartialFeatures, Track, FEATURE_COUNT};

use crate::catalog::CatalogReader;
use crate::error::SearchResult;
use crate::index::{BallTree, Neighbor, DEFAULT_LEAF_SIZE};
use crate::normalize::MinMaxScaler;

/// Upper bound on the number of tracks read into one snapshot.
pub const DEFAULT_CATALOG_LIMIT: usize = 100_000;

/// Whether seed tracks may appear in their own recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Seeds are ordinary catalog rows; a seed is usually its own nearest
    /// neighbor at distance 0.
    #[default]
    IncludeSeeds,
    /// Seeds are dropped from the result.
    ExcludeSeeds,
}

/// Tunables for a [`Recommender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommenderOptions {
    pub catalog_limit: usize,
    pub seed_policy: SeedPolicy,
    pub leaf_size: usize,
}

impl Default for RecommenderOptions {
    fn default() -> Self {
        Self {
            catalog_limit: DEFAULT_CATALOG_LIMIT,
            seed_policy: SeedPolicy::default(),
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

/// The scaler and index fitted over one catalog snapshot.
///
/// Row `i` of the index is `tracks()[i]`.
#[derive(Debug, Clone)]
pub struct FittedModel {
    tracks: Vec<Track>,
    scaler: MinMaxScaler,
    index: BallTree,
}

impl FittedModel {
    /// Fit over a non-empty snapshot.
    ///
    /// # Errors
    /// Fails on an empty snapshot or non-finite feature values.
    pub fn fit(tracks: Vec<Track>, leaf_size: usize) -> SearchResult<Self> {
        let raw: Vec<FeatureVector> = tracks.iter().map(Track::feature_vector).collect();
        let scaler = MinMaxScaler::fit(&raw)?;
        let index = BallTree::with_leaf_size(scaler.transform_all(&raw), leaf_size);
        Ok(Self {
            tracks,
            scaler,
            index,
        })
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub const fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    /// Mean of the normalized raw vectors of every seed found in the snapshot.
    ///
    /// Unknown identifiers are skipped; a repeated identifier counts once per
    /// occurrence. Returns `None` when nothing resolves.
    #[must_use]
    pub fn seed_query<S: AsRef<str>>(&self, seed_ids: &[S]) -> Option<FeatureVector> {
        let mut sum = [0.0; FEATURE_COUNT];
        let mut count = 0_usize;
        for id in seed_ids {
            let Some(track) = self.tracks.iter().find(|t| t.track_id == id.as_ref()) else {
                log::debug!("Skipping unknown seed track {}", id.as_ref());
                continue;
            };
            let normalized = self.scaler.transform(&track.feature_vector());
            for (s, v) in sum.iter_mut().zip(normalized) {
                *s += v;
            }
            count += 1;
        }

        if count == 0 {
            return None;
        }
        let count = count as f64;
        Some(sum.map(|s| s / count))
    }

    /// The supplied features in normalized space, if all ten are set and finite.
    #[must_use]
    pub fn feature_query(&self, features: &PartialFeatures) -> Option<FeatureVector> {
        let raw = features.complete()?.to_vector();
        if raw.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(self.scaler.transform(&raw))
    }

    /// Nearest rows to a normalized query.
    #[must_use]
    pub fn nearest(&self, query: &FeatureVector, k: usize) -> Vec<Neighbor> {
        self.index.query(query, k)
    }

    fn tracks_for<'a>(&'a self, neighbors: &'a [Neighbor]) -> impl Iterator<Item = &'a Track> + 'a {
        neighbors.iter().filter_map(|n| self.tracks.get(n.row))
    }
}

/// Answers recommendation requests against a catalog.
#[derive(Debug, Clone)]
pub struct Recommender<C> {
    catalog: C,
    options: RecommenderOptions,
}

impl<C: CatalogReader> Recommender<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_options(catalog, RecommenderOptions::default())
    }

    pub fn with_options(catalog: C, options: RecommenderOptions) -> Self {
        Self { catalog, options }
    }

    #[must_use]
    pub const fn options(&self) -> &RecommenderOptions {
        &self.options
    }

    /// Up to `n` tracks closest to the mean of the seed tracks.
    ///
    /// Returns an empty list if the catalog is empty, `n` is zero, or none of
    /// the identifiers are in the catalog.
    ///
    /// # Errors
    /// Fails only if the catalog cannot be read or holds non-finite values.
    pub fn recommend_from_seeds<S: AsRef<str>>(
        &self,
        seed_ids: &[S],
        n: usize,
    ) -> SearchResult<Vec<Track>> {
        let Some(model) = self.fit(n)? else {
            return Ok(Vec::new());
        };
        let Some(query) = model.seed_query(seed_ids) else {
            log::debug!("None of {} seed ids are in the catalog", seed_ids.len());
            return Ok(Vec::new());
        };

        match self.options.seed_policy {
            SeedPolicy::IncludeSeeds => {
                let k = clamp_k(n, model.tracks.len());
                let neighbors = model.nearest(&query, k);
                Ok(model.tracks_for(&neighbors).take(n).cloned().collect())
            }
            SeedPolicy::ExcludeSeeds => {
                let seeds: HashSet<&str> = seed_ids.iter().map(|s| s.as_ref()).collect();
                let k = clamp_k(n.saturating_add(seeds.len()), model.tracks.len());
                let neighbors = model.nearest(&query, k);
                Ok(model
                    .tracks_for(&neighbors)
                    .filter(|t| !seeds.contains(t.track_id.as_str()))
                    .take(n)
                    .cloned()
                    .collect())
            }
        }
    }

    /// Up to `n` tracks closest to a supplied feature vector.
    ///
    /// Returns an empty list if the catalog is empty, `n` is zero, or any of
    /// the ten similarity features is missing. Missing values are never
    /// imputed.
    ///
    /// # Errors
    /// Fails only if the catalog cannot be read or holds non-finite values.
    pub fn recommend_from_features(
        &self,
        features: &PartialFeatures,
        n: usize,
    ) -> SearchResult<Vec<Track>> {
        let missing = features.missing();
        if !missing.is_empty() {
            log::debug!("Feature vector is missing {}", missing.join(", "));
            return Ok(Vec::new());
        }

        let Some(model) = self.fit(n)? else {
            return Ok(Vec::new());
        };
        let Some(query) = model.feature_query(features) else {
            return Ok(Vec::new());
        };

        let k = clamp_k(n, model.tracks.len());
        let neighbors = model.nearest(&query, k);
        Ok(model.tracks_for(&neighbors).take(n).cloned().collect())
    }

    fn fit(&self, n: usize) -> SearchResult<Option<FittedModel>> {
        let tracks = self.catalog.all_tracks(self.options.catalog_limit)?;
        if tracks.is_empty() {
            log::debug!("Catalog is empty; nothing to recommend");
            return Ok(None);
        }
        if n == 0 {
            return Ok(None);
        }

        log::debug!(
            "Fitting recommender over {} tracks (k = {})",
            tracks.len(),
            clamp_k(n, tracks.len())
        );
        FittedModel::fit(tracks, self.options.leaf_size).map(Some)
    }
}

fn clamp_k(n: usize, rows: usize) -> usize {
    n.clamp(1, rows.max(1))
}
