//! Free-text to audio-feature translation.

mod gemini;
mod prompt;

use async_trait::async_trait;

use sonority_core::model::PartialFeatures;

use crate::error::TranslateResult;

pub use gemini::GeminiTranslator;
pub use prompt::SYSTEM_PROMPT;

/// Turns a natural-language mood description into audio features.
///
/// Implementations fill only the features the text strongly implies and
/// leave the rest unset.
#[async_trait]
pub trait FeatureTranslator: Send + Sync {
    async fn translate(&self, text: &str) -> TranslateResult<PartialFeatures>;
}
