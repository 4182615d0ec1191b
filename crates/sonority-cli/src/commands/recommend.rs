use anyhow::Result;

use sonority_etl::Config;
use sonority_search::{Recommender, RecommenderOptions, SeedPolicy};

use super::{open_db, Output};

pub fn options(config: &Config, exclude_seeds: bool) -> RecommenderOptions {
    RecommenderOptions {
        catalog_limit: config.catalog_limit,
        seed_policy: if exclude_seeds {
            SeedPolicy::ExcludeSeeds
        } else {
            SeedPolicy::IncludeSeeds
        },
        ..RecommenderOptions::default()
    }
}

pub fn run_recommend(
    config: &Config,
    track_ids: &[String],
    limit: usize,
    exclude_seeds: bool,
    output: Output,
) -> Result<()> {
    let db = open_db(config)?;
    let recommender = Recommender::with_options(&db, options(config, exclude_seeds));

    let tracks = recommender.recommend_from_seeds(track_ids, limit)?;
    if tracks.is_empty() && !output.is_json() {
        println!("No recommendations.");
        return Ok(());
    }
    output.tracks(&tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_follow_config() {
        let config = Config {
            catalog_limit: 500,
            ..Config::default()
        };
        let opts = options(&config, true);
        assert_eq!(opts.catalog_limit, 500);
        assert_eq!(opts.seed_policy, SeedPolicy::ExcludeSeeds);
        assert_eq!(options(&config, false).seed_policy, SeedPolicy::IncludeSeeds);
    }

    #[test]
    fn test_empty_results_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("data").join("sonority.db"),
            ..Config::default()
        };
        let seeds = vec!["anything".to_string()];

        // Empty catalog, then a zero limit.
        run_recommend(&config, &seeds, 10, false, Output::new(false)).unwrap();
        run_recommend(&config, &seeds, 0, false, Output::new(true)).unwrap();
    }
}
