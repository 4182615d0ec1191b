//! Feature-space recommendations for sonority.
//!
//! Fits a min-max scaler over the catalog's audio features, indexes the
//! normalized vectors in a ball tree, and answers exact k-nearest-neighbor
//! queries built either from seed tracks or from a supplied feature vector.
//! Everything is rebuilt per request; nothing is cached between calls.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod index;
pub mod normalize;
pub mod recommend;

pub use catalog::{CatalogReader, TrackLookup};
pub use error::{SearchError, SearchResult};
pub use index::{BallTree, Neighbor};
pub use normalize::MinMaxScaler;
pub use recommend::{FittedModel, Recommender, RecommenderOptions, SeedPolicy};
