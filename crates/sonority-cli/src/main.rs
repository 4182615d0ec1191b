use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use sonority_etl::config::LoggingConfig;
use sonority_etl::Config;

mod commands;

use commands::features::FeatureArgs;
use commands::Output;

#[derive(Debug, Parser)]
#[command(name = "sonority", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/sonority/sonority.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Load the catalog from a Spotify songs CSV
    ///
    /// Only runs when the catalog is empty. Rows are deduplicated by
    /// track_id (the first occurrence wins) and rows that fail to parse are
    /// skipped and counted.
    Seed {
        /// CSV file (default: seed_csv_path from the config)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Browse and edit catalog tracks
    Tracks {
        #[command(subcommand)]
        command: TracksCommand,
    },
    /// Recommend tracks similar to one or more seed tracks
    ///
    /// The seeds' audio features are normalized against the whole catalog
    /// and averaged; the tracks nearest to that point are returned, closest
    /// first. Seeds are included in their own results unless
    /// --exclude-seeds is given.
    Recommend {
        /// Seed track IDs
        #[arg(required = true)]
        track_ids: Vec<String>,

        /// Number of tracks to return
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Leave the seed tracks out of the results
        #[arg(long)]
        exclude_seeds: bool,
    },
    /// Recommend tracks close to an explicit set of audio features
    ///
    /// All ten similarity features must be given; if any is missing no
    /// tracks are returned.
    Features(FeatureArgs),
    /// Recommend tracks for a free-text mood or activity description
    ///
    /// The text is turned into audio features by a Gemini model
    /// (requires google_api_key).
    Mood {
        /// Description, e.g. "rainy afternoon reading"
        #[arg(required = true)]
        text: Vec<String>,

        /// Number of tracks to return
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Look up a Deezer audio preview for a catalog track
    Preview {
        /// Catalog track ID
        track_id: String,
    },
    /// Show catalog status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum TracksCommand {
    /// List tracks in catalog order
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Show one track
    Get { track_id: String },
    /// Find tracks whose name or artist contains the query
    Search {
        query: String,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Add a track from a JSON file ("-" reads stdin)
    Add { file: PathBuf },
    /// Change a track's name, artist, or popularity
    Update {
        track_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        popularity: Option<i32>,
    },
    /// Remove a track
    Delete { track_id: String },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file when no key is given
    Get { key: Option<String> },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let level = match logging.level.to_ascii_lowercase().as_str() {
        "trace" => twyg::LogLevel::Trace,
        "debug" => twyg::LogLevel::Debug,
        "warn" | "warning" => twyg::LogLevel::Warn,
        "error" => twyg::LogLevel::Error,
        _ => twyg::LogLevel::Info,
    };

    let opts = twyg::OptsBuilder::new()
        .coloured(logging.coloured)
        .level(level)
        .report_caller(logging.report_caller)
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid logging options: {e:?}"))?;

    twyg::setup(opts).map_err(|e| anyhow::anyhow!("Failed to set up logging: {e:?}"))?;
    Ok(())
}

fn run_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => commands::config::show_config(),
        ConfigCommand::Get { key } => commands::config::get_config(key),
        ConfigCommand::Set { key, value } => commands::config::set_config(&key, &value),
        ConfigCommand::Path => commands::config::show_path(),
        ConfigCommand::Example => commands::config::show_example(),
        ConfigCommand::Init => commands::config::init_config(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands work on the file itself and must not fail on a
    // broken one.
    let command = match cli.command {
        Commands::Config { command } => return run_config(command),
        other => other,
    };

    let config = match cli.db {
        Some(path) => Config::load_with_db_path(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    init_logging(&config.logging)?;

    let output = Output::new(cli.json);

    match command {
        Commands::Seed { csv } => commands::seed::run_seed(&config, csv, output)?,
        Commands::Tracks { command } => {
            let db = commands::open_db(&config)?;
            match command {
                TracksCommand::List { limit, offset } => {
                    commands::tracks::list(&db, limit, offset, output)?;
                }
                TracksCommand::Get { track_id } => commands::tracks::get(&db, &track_id, output)?,
                TracksCommand::Search {
                    query,
                    limit,
                    offset,
                } => commands::tracks::search(&db, &query, limit, offset, output)?,
                TracksCommand::Add { file } => commands::tracks::add(&db, &file, output)?,
                TracksCommand::Update {
                    track_id,
                    name,
                    artist,
                    popularity,
                } => commands::tracks::update(&db, &track_id, name, artist, popularity, output)?,
                TracksCommand::Delete { track_id } => {
                    commands::tracks::delete(&db, &track_id, output)?;
                }
            }
        }
        Commands::Recommend {
            track_ids,
            limit,
            exclude_seeds,
        } => commands::recommend::run_recommend(&config, &track_ids, limit, exclude_seeds, output)?,
        Commands::Features(args) => commands::features::run_features(&config, &args, output)?,
        Commands::Mood { text, limit } => {
            commands::mood::run_mood(&config, &text.join(" "), limit, output).await?;
        }
        Commands::Preview { track_id } => {
            commands::preview::run_preview(&config, &track_id, output).await?;
        }
        Commands::Status => commands::status::show_status(&config, output)?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_recommend_args() {
        let cli = Cli::try_parse_from([
            "sonority",
            "--json",
            "recommend",
            "a",
            "b",
            "-n",
            "3",
            "--exclude-seeds",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Recommend {
                track_ids,
                limit,
                exclude_seeds,
            } => {
                assert_eq!(track_ids, vec!["a", "b"]);
                assert_eq!(limit, 3);
                assert!(exclude_seeds);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_recommend_requires_a_seed() {
        assert!(Cli::try_parse_from(["sonority", "recommend"]).is_err());
    }

    #[test]
    fn test_mood_joins_words() {
        let cli = Cli::try_parse_from(["sonority", "mood", "late", "night", "drive"]).unwrap();
        match cli.command {
            Commands::Mood { text, limit } => {
                assert_eq!(text.join(" "), "late night drive");
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
