use anyhow::{Context, Result};

use sonority_etl::{Config, GeminiTranslator, MoodRecommender};
use sonority_search::Recommender;

use super::recommend::options;
use super::{open_db, Output};

pub async fn run_mood(config: &Config, text: &str, limit: usize, output: Output) -> Result<()> {
    let translator = GeminiTranslator::from_config(config).context(
        "Mood search needs a Google API key.\n\nSet it with:\n  \
         sonority config set google_api_key <key>\nor SONO_GOOGLE_API_KEY",
    )?;

    let db = open_db(config)?;
    let mood = MoodRecommender::new(
        Recommender::with_options(&db, options(config, false)),
        translator,
    );

    log::info!("Translating mood: {text}");
    let result = mood.recommend_from_text(text, limit).await?;

    if output.is_json() {
        return output.json(&result);
    }

    println!("\n🎧 \"{text}\"\n");
    if !result.missing.is_empty() {
        println!(
            "The description did not pin down: {}",
            result.missing.join(", ")
        );
        println!("Try a more specific description.");
        return Ok(());
    }
    output.tracks(&result.tracks)
}
