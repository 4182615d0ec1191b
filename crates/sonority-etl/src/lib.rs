//! Collaborators around the sonority recommendation engine.
//!
//! Loads the catalog from the Spotify songs CSV, translates free-text mood
//! descriptions into audio features with a language model, looks up audio
//! previews on Deezer, and holds the layered configuration.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod enrich;
pub mod error;
pub mod mood;
pub mod seed;
pub mod translate;

pub use config::Config;
pub use enrich::deezer::{DeezerClient, TrackPreview};
pub use error::{
    EnrichError, EnrichResult, MoodError, SeedError, SeedResult, TranslateError, TranslateResult,
};
pub use mood::{MoodRecommendation, MoodRecommender};
pub use seed::{seed_from_csv, seed_from_reader, SeedReport};
pub use translate::{FeatureTranslator, GeminiTranslator};
