use anyhow::Result;

use sonority_etl::{Config, DeezerClient};

use super::{open_db, Output};

pub async fn run_preview(config: &Config, track_id: &str, output: Output) -> Result<()> {
    let db = open_db(config)?;
    let client = DeezerClient::new(config.deezer_base_url.clone())?;

    let preview = match client.preview_for_id(&db, track_id).await {
        Ok(p) => p,
        Err(e) if e.is_not_found() => {
            anyhow::bail!("No Deezer match for {track_id}");
        }
        Err(e) => return Err(e.into()),
    };

    if output.is_json() {
        return output.json(&preview);
    }

    println!("{} - {}", preview.track_artist, preview.track_name);
    println!("  deezer id: {}", preview.deezer_id);
    println!(
        "  preview:   {}",
        preview.preview_url.as_deref().unwrap_or("<none>")
    );
    println!(
        "  link:      {}",
        preview.external_url.as_deref().unwrap_or("<none>")
    );
    println!(
        "  image:     {}",
        preview.album_image.as_deref().unwrap_or("<none>")
    );
    Ok(())
}
