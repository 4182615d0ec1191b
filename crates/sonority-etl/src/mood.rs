//! Recommendations from a free-text description.
//!
//! The description is translated into audio features, and those features
//! go straight to [`Recommender::recommend_from_features`]. A description
//! that leaves any similarity feature unset yields no tracks.

use serde::Serialize;

use sonority_core::model::{PartialFeatures, Track};
use sonority_search::{CatalogReader, Recommender};

use crate::error::MoodError;
use crate::translate::FeatureTranslator;

/// The translated features together with the tracks they matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodRecommendation {
    pub features: PartialFeatures,
    pub missing: Vec<&'static str>,
    pub tracks: Vec<Track>,
}

#[derive(Debug)]
pub struct MoodRecommender<C, T> {
    recommender: Recommender<C>,
    translator: T,
}

impl<C: CatalogReader, T: FeatureTranslator> MoodRecommender<C, T> {
    pub fn new(recommender: Recommender<C>, translator: T) -> Self {
        Self {
            recommender,
            translator,
        }
    }

    pub async fn recommend_from_text(
        &self,
        text: &str,
        n: usize,
    ) -> Result<MoodRecommendation, MoodError> {
        let features = self.translator.translate(text).await?;
        let missing = features.missing();
        if !missing.is_empty() {
            log::info!(
                "Description left {} of the similarity features unset",
                missing.len()
            );
        }

        let tracks = self.recommender.recommend_from_features(&features, n)?;
        Ok(MoodRecommendation {
            features,
            missing,
            tracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sonority_core::model::AudioFeatures;

    use crate::error::{TranslateError, TranslateResult};

    struct Fixed(PartialFeatures);

    #[async_trait]
    impl FeatureTranslator for Fixed {
        async fn translate(&self, _text: &str) -> TranslateResult<PartialFeatures> {
            Ok(self.0)
        }
    }

    struct Failing;

    #[async_trait]
    impl FeatureTranslator for Failing {
        async fn translate(&self, _text: &str) -> TranslateResult<PartialFeatures> {
            Err(TranslateError::EmptyResponse { provider: "test" })
        }
    }

    fn track(id: &str, energy: f64) -> Track {
        Track::new(
            id,
            id,
            "Artist",
            AudioFeatures {
                danceability: 0.5,
                energy,
                key: 2,
                loudness: -7.0,
                speechiness: 0.05,
                acousticness: 0.2,
                instrumentalness: 0.0,
                liveness: 0.1,
                valence: 0.5,
                tempo: 110.0,
            },
        )
    }

    fn catalog() -> Vec<Track> {
        vec![track("calm", 0.1), track("mid", 0.5), track("loud", 0.95)]
    }

    #[tokio::test]
    async fn test_complete_features_recommend_nearest() {
        let wanted = PartialFeatures::from(track("q", 0.9).features);
        let mood = MoodRecommender::new(Recommender::new(catalog()), Fixed(wanted));

        let result = mood.recommend_from_text("gym session", 2).await.unwrap();

        assert!(result.missing.is_empty());
        let ids: Vec<&str> = result.tracks.iter().map(|t| t.track_id.as_str()).collect();
        assert_eq!(ids, vec!["loud", "mid"]);
    }

    #[tokio::test]
    async fn test_partial_features_recommend_nothing() {
        let partial = PartialFeatures {
            energy: Some(0.9),
            tempo: Some(140.0),
            ..PartialFeatures::default()
        };
        let mood = MoodRecommender::new(Recommender::new(catalog()), Fixed(partial));

        let result = mood.recommend_from_text("workout", 5).await.unwrap();

        assert!(result.tracks.is_empty());
        assert_eq!(result.features.energy, Some(0.9));
        assert!(result.missing.contains(&"danceability"));
        assert!(!result.missing.contains(&"energy"));
    }

    #[tokio::test]
    async fn test_translation_error_propagates() {
        let mood = MoodRecommender::new(Recommender::new(catalog()), Failing);
        let err = mood.recommend_from_text("anything", 5).await.unwrap_err();
        assert!(matches!(err, MoodError::Translate(_)));
    }
}
