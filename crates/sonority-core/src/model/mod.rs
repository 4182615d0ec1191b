pub mod features;
pub mod track;

pub use features::{AudioFeatures, FeatureVector, PartialFeatures, FEATURE_COUNT, FEATURE_NAMES};
pub use track::{Track, TrackUpdate};
