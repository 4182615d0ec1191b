//! End-to-end recommendation tests against an in-memory catalog database.

use sonority_core::model::{AudioFeatures, PartialFeatures, Track};
use sonority_core::schema::Database;
use sonority_search::{FittedModel, Recommender, RecommenderOptions, SeedPolicy};

#[allow(clippy::too_many_arguments)]
fn features(
    danceability: f64,
    energy: f64,
    key: i32,
    loudness: f64,
    speechiness: f64,
    acousticness: f64,
    instrumentalness: f64,
    liveness: f64,
    valence: f64,
    tempo: f64,
) -> AudioFeatures {
    AudioFeatures {
        danceability,
        energy,
        key,
        loudness,
        speechiness,
        acousticness,
        instrumentalness,
        liveness,
        valence,
        tempo,
    }
}

fn reference() -> Track {
    Track::new(
        "ref_1",
        "Reference 1",
        "Ref Artist",
        features(0.8, 0.8, 1, -5.0, 0.05, 0.1, 0.0, 0.1, 0.8, 120.0),
    )
    .with_album("album_1", "Ref Album", "2023-01-01")
    .with_popularity(50)
    .with_duration_ms(200_000)
}

fn close_match() -> Track {
    Track::new(
        "match_1",
        "Match 1",
        "Match Artist",
        features(0.79, 0.81, 1, -5.1, 0.05, 0.11, 0.01, 0.11, 0.79, 121.0),
    )
    .with_album("album_2", "Match Album", "2023-01-01")
    .with_popularity(50)
    .with_duration_ms(200_000)
}

fn different() -> Track {
    Track::new(
        "diff_1",
        "Different",
        "Diff Artist",
        features(0.1, 0.1, 1, -20.0, 0.05, 0.9, 0.9, 0.1, 0.1, 60.0),
    )
    .with_album("album_3", "Diff Album", "2023-01-01")
    .with_popularity(50)
    .with_duration_ms(200_000)
}

fn text_match() -> Track {
    Track::new(
        "text_match",
        "Text Match",
        "Artist",
        features(0.5, 0.5, 0, -5.0, 0.05, 0.1, 0.0, 0.1, 0.5, 120.0),
    )
    .with_album("album_4", "Text Album", "2023-01-01")
    .with_popularity(50)
    .with_duration_ms(200_000)
}

fn mood_features() -> PartialFeatures {
    PartialFeatures {
        danceability: Some(0.5),
        energy: Some(0.5),
        valence: Some(0.5),
        tempo: Some(120.0),
        acousticness: Some(0.1),
        instrumentalness: Some(0.0),
        speechiness: Some(0.05),
        liveness: Some(0.1),
        loudness: Some(-5.0),
        key: Some(0),
        mode: Some(1),
        duration_ms: Some(200_000),
    }
}

fn seeded_db(tracks: &[Track]) -> Database {
    let db = Database::open_in_memory().unwrap();
    db.insert_tracks(tracks).unwrap();
    db
}

fn ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.track_id.clone()).collect()
}

#[test]
fn test_empty_catalog_returns_nothing() {
    let db = Database::open_in_memory().unwrap();
    let rec = Recommender::new(&db);

    assert!(rec.recommend_from_seeds(&["ref_1"], 5).unwrap().is_empty());
    assert!(rec
        .recommend_from_features(&mood_features(), 5)
        .unwrap()
        .is_empty());
}

#[test]
fn test_unknown_seeds_return_nothing() {
    let db = seeded_db(&[reference(), close_match(), different()]);
    let rec = Recommender::new(&db);
    assert!(rec.recommend_from_seeds(&["nonexistent"], 5).unwrap().is_empty());
    assert!(rec.recommend_from_seeds::<&str>(&[], 5).unwrap().is_empty());
}

#[test]
fn test_partially_known_seeds_use_the_known_ones() {
    let db = seeded_db(&[reference(), close_match(), different()]);
    let rec = Recommender::new(&db);
    let with_ghost = rec.recommend_from_seeds(&["ghost", "ref_1"], 3).unwrap();
    let plain = rec.recommend_from_seeds(&["ref_1"], 3).unwrap();
    assert_eq!(ids(&with_ghost), ids(&plain));
}

#[test]
fn test_any_missing_feature_returns_nothing() {
    let db = seeded_db(&[reference(), close_match(), different(), text_match()]);
    let rec = Recommender::new(&db);

    let mut partial = mood_features();
    partial.energy = None;
    assert!(rec.recommend_from_features(&partial, 5).unwrap().is_empty());

    let mut no_key = mood_features();
    no_key.key = None;
    assert!(rec.recommend_from_features(&no_key, 5).unwrap().is_empty());
}

#[test]
fn test_mode_and_duration_are_not_required() {
    let db = seeded_db(&[reference(), text_match()]);
    let rec = Recommender::new(&db);

    let mut partial = mood_features();
    partial.mode = None;
    partial.duration_ms = None;
    assert_eq!(rec.recommend_from_features(&partial, 5).unwrap().len(), 2);
}

#[test]
fn test_n_larger_than_catalog_is_clamped() {
    let db = seeded_db(&[reference(), close_match(), different()]);
    let rec = Recommender::new(&db);
    assert_eq!(rec.recommend_from_seeds(&["ref_1"], 50).unwrap().len(), 3);
    assert_eq!(
        rec.recommend_from_features(&mood_features(), 50)
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn test_match_ranks_above_diff() {
    let db = seeded_db(&[reference(), close_match(), different()]);
    let rec = Recommender::new(&db);
    let found = ids(&rec.recommend_from_seeds(&["ref_1"], 5).unwrap());

    assert_eq!(found, vec!["ref_1", "match_1", "diff_1"]);
}

#[test]
fn test_seed_first_then_neighbor() {
    let db = seeded_db(&[reference(), close_match(), different()]);
    let rec = Recommender::new(&db);
    let found = ids(&rec.recommend_from_seeds(&["ref_1"], 2).unwrap());
    assert_eq!(found, vec!["ref_1", "match_1"]);
}

#[test]
fn test_excluding_seeds_keeps_the_requested_count() {
    let db = seeded_db(&[reference(), close_match(), different()]);
    let options = RecommenderOptions {
        seed_policy: SeedPolicy::ExcludeSeeds,
        ..RecommenderOptions::default()
    };
    let rec = Recommender::with_options(&db, options);
    let found = ids(&rec.recommend_from_seeds(&["ref_1"], 2).unwrap());
    assert_eq!(found, vec!["match_1", "diff_1"]);
}

#[test]
fn test_feature_query_finds_exact_match_first() {
    let db = seeded_db(&[reference(), close_match(), different(), text_match()]);
    let rec = Recommender::new(&db);
    let found = ids(&rec.recommend_from_features(&mood_features(), 5).unwrap());
    assert_eq!(found.first().map(String::as_str), Some("text_match"));
    assert_eq!(found.len(), 4);
}

#[test]
fn test_repeated_calls_are_deterministic() {
    let db = seeded_db(&[reference(), close_match(), different(), text_match()]);
    let rec = Recommender::new(&db);

    let first = ids(&rec.recommend_from_seeds(&["match_1", "diff_1"], 4).unwrap());
    let second = ids(&rec.recommend_from_seeds(&["match_1", "diff_1"], 4).unwrap());
    assert_eq!(first, second);

    let first = ids(&rec.recommend_from_features(&mood_features(), 4).unwrap());
    let second = ids(&rec.recommend_from_features(&mood_features(), 4).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_normalized_catalog_rows_are_in_unit_interval() {
    let tracks = vec![reference(), close_match(), different(), text_match()];
    let model = FittedModel::fit(tracks.clone(), 2).unwrap();
    let scaler = model.scaler();

    for track in &tracks {
        let scaled = scaler.transform(&track.feature_vector());
        for (i, v) in scaled.iter().enumerate() {
            if scaler.is_degenerate(i) {
                assert_eq!(*v, 0.0);
            } else {
                assert!((0.0..=1.0).contains(v), "feature {i} = {v}");
            }
        }
    }
}

#[test]
fn test_two_seed_query_is_mean_of_normalized_seeds() {
    // Only danceability, energy and tempo vary; the rest are zero-variance.
    let p = Track::new(
        "p",
        "P",
        "X",
        features(0.0, 0.0, 1, -5.0, 0.05, 0.1, 0.0, 0.1, 0.5, 60.0),
    );
    let q = Track::new(
        "q",
        "Q",
        "X",
        features(0.3, 0.6, 1, -5.0, 0.05, 0.1, 0.0, 0.1, 0.5, 100.0),
    );
    let r = Track::new(
        "r",
        "R",
        "X",
        features(1.0, 1.0, 1, -5.0, 0.05, 0.1, 0.0, 0.1, 0.5, 180.0),
    );
    let model = FittedModel::fit(vec![p.clone(), q, r.clone()], 1).unwrap();

    let query = model.seed_query(&["p", "r"]).unwrap();
    let np = model.scaler().transform(&p.feature_vector());
    let nr = model.scaler().transform(&r.feature_vector());
    for i in 0..query.len() {
        assert!((query[i] - (np[i] + nr[i]) / 2.0).abs() < 1e-12);
    }
    assert!((query[0] - 0.5).abs() < 1e-12);
    assert!((query[9] - 0.5).abs() < 1e-12);

    // Normalized: p = (0, 0, 0), q = (0.3, 0.6, 1/3), r = (1, 1, 1) over
    // (danceability, energy, tempo). Query = (0.5, 0.5, 0.5).
    // d(q) = sqrt(0.04 + 0.01 + 1/36), d(p) = d(r) = sqrt(0.75).
    let neighbors = model.nearest(&query, 3);
    let rows: Vec<usize> = neighbors.iter().map(|n| n.row).collect();
    assert_eq!(rows, vec![1, 0, 2]);

    let expected_q = (0.04_f64 + 0.01 + 1.0 / 36.0).sqrt();
    assert!((neighbors[0].distance - expected_q).abs() < 1e-9);
    assert!((neighbors[1].distance - 0.75_f64.sqrt()).abs() < 1e-9);
    assert!((neighbors[2].distance - 0.75_f64.sqrt()).abs() < 1e-9);

    let rec = Recommender::new(vec![
        p,
        model.tracks()[1].clone(),
        r,
    ]);
    let found = ids(&rec.recommend_from_seeds(&["p", "r"], 3).unwrap());
    assert_eq!(found, vec!["q", "p", "r"]);
}

#[test]
fn test_catalog_limit_bounds_the_snapshot() {
    let db = seeded_db(&[reference(), close_match(), different()]);
    let options = RecommenderOptions {
        catalog_limit: 2,
        ..RecommenderOptions::default()
    };
    let rec = Recommender::with_options(&db, options);
    // diff_1 is the third row and falls outside the snapshot.
    assert!(rec.recommend_from_seeds(&["diff_1"], 3).unwrap().is_empty());
    assert_eq!(rec.recommend_from_seeds(&["ref_1"], 3).unwrap().len(), 2);
}
