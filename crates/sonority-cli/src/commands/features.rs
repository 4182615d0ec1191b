use anyhow::Result;

use sonority_core::model::PartialFeatures;
use sonority_etl::Config;
use sonority_search::Recommender;

use super::recommend::options;
use super::{open_db, Output};

/// Audio features for a `features` query.
#[derive(Debug, Clone, clap::Args)]
pub struct FeatureArgs {
    #[arg(long)]
    pub danceability: Option<f64>,
    #[arg(long)]
    pub energy: Option<f64>,
    /// Pitch class, 0 = C through 11 = B
    #[arg(long)]
    pub key: Option<i32>,
    /// Decibels, typically -60 to 0
    #[arg(long, allow_hyphen_values = true)]
    pub loudness: Option<f64>,
    #[arg(long)]
    pub speechiness: Option<f64>,
    #[arg(long)]
    pub acousticness: Option<f64>,
    #[arg(long)]
    pub instrumentalness: Option<f64>,
    #[arg(long)]
    pub liveness: Option<f64>,
    #[arg(long)]
    pub valence: Option<f64>,
    /// Beats per minute
    #[arg(long)]
    pub tempo: Option<f64>,

    /// Number of tracks to return
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

impl FeatureArgs {
    pub fn to_features(&self) -> PartialFeatures {
        PartialFeatures {
            danceability: self.danceability,
            energy: self.energy,
            key: self.key,
            loudness: self.loudness,
            speechiness: self.speechiness,
            acousticness: self.acousticness,
            instrumentalness: self.instrumentalness,
            liveness: self.liveness,
            valence: self.valence,
            tempo: self.tempo,
            ..PartialFeatures::default()
        }
    }
}

pub fn run_features(config: &Config, args: &FeatureArgs, output: Output) -> Result<()> {
    let features = args.to_features();
    let missing = features.missing();
    if !missing.is_empty() && !output.is_json() {
        println!("Missing features: {}", missing.join(", "));
        println!("All ten similarity features are needed to search.");
        return Ok(());
    }

    let db = open_db(config)?;
    let recommender = Recommender::with_options(&db, options(config, false));
    let tracks = recommender.recommend_from_features(&features, args.limit)?;
    output.tracks(&tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: FeatureArgs,
    }

    #[test]
    fn test_negative_loudness_parses() {
        let h = Harness::try_parse_from([
            "features",
            "--loudness",
            "-7.5",
            "--energy",
            "0.4",
            "-n",
            "3",
        ])
        .unwrap();
        assert_eq!(h.args.loudness, Some(-7.5));
        assert_eq!(h.args.limit, 3);

        let f = h.args.to_features();
        assert_eq!(f.energy, Some(0.4));
        assert!(f.mode.is_none());
        assert_eq!(f.missing().len(), 8);
    }
}
