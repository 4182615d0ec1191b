use anyhow::{Context, Result};
use std::path::PathBuf;

use sonority_etl::{seed_from_csv, Config};

use super::{open_db, Output};

pub fn run_seed(config: &Config, csv: Option<PathBuf>, output: Output) -> Result<()> {
    let Some(csv_path) = csv.or_else(|| config.seed_csv_path.clone()) else {
        anyhow::bail!(
            "No CSV given.\n\nPass --csv /path/to/spotify_songs.csv or set seed_csv_path:\n  \
             sonority config set seed_csv_path /path/to/spotify_songs.csv"
        );
    };

    if !csv_path.exists() {
        anyhow::bail!("CSV file not found: {}", csv_path.display());
    }

    log::info!("Seeding catalog from {}", csv_path.display());
    let db = open_db(config)?;
    let report = seed_from_csv(&db, &csv_path)
        .with_context(|| format!("Failed to seed from {}", csv_path.display()))?;

    if output.is_json() {
        return output.json(&report);
    }

    if report.skipped_existing {
        println!("Catalog already has tracks; nothing to do.");
        return Ok(());
    }

    println!("\n🎵 Seed complete\n");
    println!("  Inserted:   {}", report.inserted);
    println!("  Duplicates: {}", report.duplicates);
    println!("  Skipped:    {} malformed rows", report.invalid);
    println!("  Database:   {}", config.database_path.display());

    Ok(())
}
