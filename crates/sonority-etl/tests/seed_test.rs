//! Seed an on-disk catalog from CSV and query it.

use std::fs;

use sonority_core::schema::Database;
use sonority_etl::{seed_from_csv, seed_from_reader};
use sonority_search::Recommender;
use tempfile::TempDir;

const CSV: &str = "\
track_id,track_name,track_artist,track_popularity,track_album_id,track_album_name,track_album_release_date,playlist_name,playlist_id,playlist_genre,playlist_subgenre,danceability,energy,key,loudness,mode,speechiness,acousticness,instrumentalness,liveness,valence,tempo,duration_ms
6f807x0ima9a1j3VPbc7VN,I Don't Care (with Justin Bieber) - Loud Luxury Remix,Ed Sheeran,66,2oCs0DGTsRO98Gh5ZSl2Cx,I Don't Care (with Justin Bieber) [Loud Luxury Remix],2019-06-14,Pop Remix,37i9dQZF1DXcZDD7cfEKhW,pop,dance pop,0.748,0.916,6,-2.634,1,0.0583,0.102,0,0.0653,0.518,122.036,194754
0r7CVbZTWZgbTCYdfa2P31,Memories - Dillon Francis Remix,Maroon 5,67,63rPSO264uRjW1X5E6cWv6,Memories (Dillon Francis Remix),2019-12-13,Pop Remix,37i9dQZF1DXcZDD7cfEKhW,pop,dance pop,0.726,0.815,11,-4.969,1,0.0373,0.0724,0.00421,0.357,0.693,99.972,162600
1z1Hg7Vb0AhHDiEmnDE79l,All the Time - Don Diablo Remix,Zara Larsson,70,1HoSmj2eLcsrR0vE9gThr4,All the Time (Don Diablo Remix),2019-07-05,Pop Remix,37i9dQZF1DXcZDD7cfEKhW,pop,dance pop,0.675,0.931,1,-3.432,0,0.0742,0.0794,0.0000233,0.11,0.613,124.008,176616
6f807x0ima9a1j3VPbc7VN,I Don't Care (with Justin Bieber) - Loud Luxury Remix,Ed Sheeran,66,2oCs0DGTsRO98Gh5ZSl2Cx,I Don't Care (with Justin Bieber) [Loud Luxury Remix],2019-06-14,Dance Pop,37i9dQZF1DWZQaaqNMbbXa,pop,dance pop,0.748,0.916,6,-2.634,1,0.0583,0.102,0,0.0653,0.518,122.036,194754
2oXxGlkXncc7Lw2fPLbuz1,Nocturne in E-flat,Quiet Pianist,30,alb9,Nocturnes,1998,,,,,0.21,0.05,3,-24.1,1,0.04,0.99,0.93,0.08,0.12,64.2,301000
broken,Broken Row,Nobody,oops,alb0,None,2000,,,,,0.5,0.5,0,-5,1,0.1,0.1,0.1,0.1,0.1,100,1000
";

fn setup() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("spotify_songs.csv");
    fs::write(&csv_path, CSV).unwrap();

    let db = Database::open(dir.path().join("sonority.db")).unwrap();
    let report = seed_from_csv(&db, &csv_path).unwrap();
    assert_eq!(report.inserted, 4);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.invalid, 1);
    (dir, db)
}

#[test]
fn test_seeded_catalog_is_queryable() {
    let (_dir, db) = setup();

    let piano = db.get_track("2oXxGlkXncc7Lw2fPLbuz1").unwrap().unwrap();
    assert!(piano.playlist_name.is_none());
    assert_eq!(piano.track_album_release_date, "1998");

    let first = db.get_track("6f807x0ima9a1j3VPbc7VN").unwrap().unwrap();
    assert_eq!(first.playlist_name.as_deref(), Some("Pop Remix"));
}

#[test]
fn test_reseeding_is_a_no_op() {
    let (dir, db) = setup();
    let report = seed_from_csv(&db, &dir.path().join("spotify_songs.csv")).unwrap();
    assert!(report.skipped_existing);
    assert_eq!(db.count_tracks().unwrap(), 4);
}

#[test]
fn test_recommend_over_seeded_catalog() {
    let (_dir, db) = setup();
    let rec = Recommender::new(&db);

    let found = rec
        .recommend_from_seeds(&["2oXxGlkXncc7Lw2fPLbuz1"], 4)
        .unwrap();

    assert_eq!(found.len(), 4);
    assert_eq!(found[0].track_id, "2oXxGlkXncc7Lw2fPLbuz1");
}

#[test]
fn test_catalog_persists_across_reopen() {
    let (dir, db) = setup();
    drop(db);

    let reopened = Database::open(dir.path().join("sonority.db")).unwrap();
    assert_eq!(reopened.count_tracks().unwrap(), 4);
}

#[test]
fn test_non_finite_row_does_not_poison_recommendations() {
    // The piano track's tempo becomes infinite.
    let csv = CSV.replace(",64.2,301000", ",inf,301000");
    let db = Database::open_in_memory().unwrap();

    let report = seed_from_reader(&db, csv.as_bytes()).unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.invalid, 2);

    let found = Recommender::new(&db)
        .recommend_from_seeds(&["6f807x0ima9a1j3VPbc7VN"], 2)
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].track_id, "6f807x0ima9a1j3VPbc7VN");
}
