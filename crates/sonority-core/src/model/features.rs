use serde::{Deserialize, Serialize};

/// Number of audio features that take part in similarity comparison.
pub const FEATURE_COUNT: usize = 10;

/// Canonical feature order. Every [`FeatureVector`] is laid out in this order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
];

/// A raw or normalized point in feature space.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// The ten similarity features of a track.
///
/// `mode` and `duration_ms` live on [`Track`](crate::model::Track) rather
/// than here because they do not participate in similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Suitability for dancing, 0.0-1.0.
    pub danceability: f64,
    /// Perceptual intensity, 0.0-1.0.
    pub energy: f64,
    /// Pitch class, 0 = C through 11 = B.
    pub key: i32,
    /// Overall loudness in dB, roughly -60 to 0.
    pub loudness: f64,
    /// Presence of spoken words, 0.0-1.0.
    pub speechiness: f64,
    /// Confidence the track is acoustic, 0.0-1.0.
    pub acousticness: f64,
    /// Likelihood the track has no vocals, 0.0-1.0.
    pub instrumentalness: f64,
    /// Presence of a live audience, 0.0-1.0.
    pub liveness: f64,
    /// Musical positiveness, 0.0-1.0.
    pub valence: f64,
    /// Estimated tempo in BPM.
    pub tempo: f64,
}

impl AudioFeatures {
    /// Lay the features out in [`FEATURE_NAMES`] order.
    #[must_use]
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.danceability,
            self.energy,
            f64::from(self.key),
            self.loudness,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.valence,
            self.tempo,
        ]
    }

    /// Look up a feature by its canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_vector()[i])
    }

    /// Name of the first feature that is NaN or infinite, if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<&'static str> {
        FEATURE_NAMES
            .iter()
            .zip(self.to_vector())
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| *name)
    }
}

impl From<AudioFeatures> for FeatureVector {
    fn from(features: AudioFeatures) -> Self {
        features.to_vector()
    }
}

/// A feature set where any field may be missing.
///
/// This is what the mood translator produces: the language model only fills
/// in the features the description strongly implies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialFeatures {
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub key: Option<i32>,
    #[serde(default)]
    pub loudness: Option<f64>,
    #[serde(default)]
    pub mode: Option<i32>,
    #[serde(default)]
    pub speechiness: Option<f64>,
    #[serde(default)]
    pub acousticness: Option<f64>,
    #[serde(default)]
    pub instrumentalness: Option<f64>,
    #[serde(default)]
    pub liveness: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

impl PartialFeatures {
    /// Returns the full feature set if all ten similarity features are set.
    ///
    /// `mode` and `duration_ms` are ignored.
    #[must_use]
    pub fn complete(&self) -> Option<AudioFeatures> {
        Some(AudioFeatures {
            danceability: self.danceability?,
            energy: self.energy?,
            key: self.key?,
            loudness: self.loudness?,
            speechiness: self.speechiness?,
            acousticness: self.acousticness?,
            instrumentalness: self.instrumentalness?,
            liveness: self.liveness?,
            valence: self.valence?,
            tempo: self.tempo?,
        })
    }

    /// Names of the similarity features that are still unset.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        let present = [
            self.danceability.is_some(),
            self.energy.is_some(),
            self.key.is_some(),
            self.loudness.is_some(),
            self.speechiness.is_some(),
            self.acousticness.is_some(),
            self.instrumentalness.is_some(),
            self.liveness.is_some(),
            self.valence.is_some(),
            self.tempo.is_some(),
        ];
        FEATURE_NAMES
            .iter()
            .zip(present)
            .filter(|(_, set)| !set)
            .map(|(name, _)| *name)
            .collect()
    }
}

impl From<AudioFeatures> for PartialFeatures {
    fn from(f: AudioFeatures) -> Self {
        Self {
            danceability: Some(f.danceability),
            energy: Some(f.energy),
            key: Some(f.key),
            loudness: Some(f.loudness),
            mode: None,
            speechiness: Some(f.speechiness),
            acousticness: Some(f.acousticness),
            instrumentalness: Some(f.instrumentalness),
            liveness: Some(f.liveness),
            valence: Some(f.valence),
            tempo: Some(f.tempo),
            duration_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AudioFeatures {
        AudioFeatures {
            danceability: 0.8,
            energy: 0.7,
            key: 5,
            loudness: -6.0,
            speechiness: 0.05,
            acousticness: 0.1,
            instrumentalness: 0.0,
            liveness: 0.12,
            valence: 0.9,
            tempo: 124.0,
        }
    }

    #[test]
    fn test_vector_follows_canonical_order() {
        let v = sample().to_vector();
        assert_eq!(v[0], 0.8);
        assert_eq!(v[2], 5.0);
        assert_eq!(v[3], -6.0);
        assert_eq!(v[9], 124.0);
    }

    #[test]
    fn test_get_by_name() {
        let f = sample();
        assert_eq!(f.get("tempo"), Some(124.0));
        assert_eq!(f.get("key"), Some(5.0));
        assert_eq!(f.get("mode"), None);
    }

    #[test]
    fn test_first_non_finite() {
        assert_eq!(sample().first_non_finite(), None);

        let mut f = sample();
        f.tempo = f64::INFINITY;
        assert_eq!(f.first_non_finite(), Some("tempo"));

        f.energy = f64::NAN;
        assert_eq!(f.first_non_finite(), Some("energy"));
    }

    #[test]
    fn test_partial_complete_ignores_mode_and_duration() {
        let partial = PartialFeatures::from(sample());
        assert!(partial.mode.is_none());
        assert_eq!(partial.complete(), Some(sample()));
    }

    #[test]
    fn test_partial_with_missing_field_is_incomplete() {
        let mut partial = PartialFeatures::from(sample());
        partial.energy = None;
        assert!(partial.complete().is_none());
        assert_eq!(partial.missing(), vec!["energy"]);
    }

    #[test]
    fn test_partial_default_is_all_missing() {
        let partial = PartialFeatures::default();
        assert_eq!(partial.missing().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_partial_deserializes_nulls_and_absent_fields() {
        let json = r#"{"danceability": 0.5, "energy": null, "mode": 1}"#;
        let partial: PartialFeatures = serde_json::from_str(json).unwrap();
        assert_eq!(partial.danceability, Some(0.5));
        assert!(partial.energy.is_none());
        assert!(partial.tempo.is_none());
        assert_eq!(partial.mode, Some(1));
    }
}
