use anyhow::{Context, Result};
use sonority_etl::{config, Config};
use toml_edit::{value, DocumentMut};

const KEYS: &[&str] = &[
    "database_path",
    "seed_csv_path",
    "catalog_limit",
    "google_api_key",
    "model",
    "gemini_base_url",
    "deezer_base_url",
    "logging.level",
    "logging.coloured",
    "logging.report_caller",
];

fn mask(secret: Option<&str>) -> String {
    match secret {
        None => "<not set>".to_string(),
        Some(s) if s.chars().count() <= 4 => "****".to_string(),
        Some(s) => format!("{}****", s.chars().take(4).collect::<String>()),
    }
}

fn lookup(config: &Config, key: &str) -> Option<String> {
    let unset = || String::from("<not set>");
    Some(match key {
        "database_path" => config.database_path.display().to_string(),
        "seed_csv_path" => config
            .seed_csv_path
            .as_ref()
            .map_or_else(unset, |p| p.display().to_string()),
        "catalog_limit" => config.catalog_limit.to_string(),
        "google_api_key" => config.google_api_key.clone().unwrap_or_else(unset),
        "model" => config.model.clone(),
        "gemini_base_url" => config.gemini_base_url.clone(),
        "deezer_base_url" => config.deezer_base_url.clone(),
        "logging.level" => config.logging.level.clone(),
        "logging.coloured" => config.logging.coloured.to_string(),
        "logging.report_caller" => config.logging.report_caller.to_string(),
        _ => return None,
    })
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown config key: {}\n\nValid keys: {}",
        key,
        KEYS.join(", ")
    )
}

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    for key in KEYS {
        let shown = if *key == "google_api_key" {
            mask(config.google_api_key.as_deref())
        } else {
            lookup(&config, key).unwrap_or_default()
        };
        println!("  {key}: {shown}");
    }

    println!("\nPriority: CLI args > ENV vars (SONO_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        let shown = lookup(&config, &key).ok_or_else(|| unknown_key(&key))?;
        println!("{shown}");
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'sonority config init' to create it.");
        }
    }

    Ok(())
}

/// Return `contents` with `key` set to `raw`, keeping comments and layout.
fn set_value(contents: &str, key: &str, raw: &str) -> Result<String> {
    let mut doc: DocumentMut = contents.parse().context("Config file is not valid TOML")?;

    let item = match key {
        "catalog_limit" => {
            let n: i64 = raw
                .parse()
                .with_context(|| format!("{key} must be a whole number"))?;
            if n <= 0 {
                anyhow::bail!("{key} must be positive");
            }
            value(n)
        }
        "logging.coloured" | "logging.report_caller" => {
            let b: bool = raw
                .parse()
                .with_context(|| format!("{key} must be true or false"))?;
            value(b)
        }
        k if KEYS.contains(&k) => value(raw),
        _ => return Err(unknown_key(key)),
    };

    match key.split_once('.') {
        Some((table, field)) => doc[table][field] = item,
        None => doc[key] = item,
    }

    Ok(doc.to_string())
}

/// Set a config value.
pub fn set_config(key: &str, raw: &str) -> Result<()> {
    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let updated = set_value(&contents, key, raw)?;

    std::fs::write(&config_path, updated).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, raw);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    let config_path = config::config_file_path();
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure sonority.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_top_level_string() {
        let out = set_value(config::example_config(), "model", "gemini-2.5-pro").unwrap();
        assert!(out.contains("model = \"gemini-2.5-pro\""));
        // Comments survive.
        assert!(out.contains("# Sonority Configuration File"));
    }

    #[test]
    fn test_set_nested_bool() {
        let out = set_value(config::example_config(), "logging.coloured", "false").unwrap();
        let doc: DocumentMut = out.parse().unwrap();
        assert_eq!(doc["logging"]["coloured"].as_bool(), Some(false));
    }

    #[test]
    fn test_set_typed_values_are_validated() {
        assert!(set_value("", "catalog_limit", "lots").is_err());
        assert!(set_value("", "catalog_limit", "0").is_err());
        assert!(set_value("", "logging.report_caller", "maybe").is_err());

        let out = set_value("", "catalog_limit", "5000").unwrap();
        let doc: DocumentMut = out.parse().unwrap();
        assert_eq!(doc["catalog_limit"].as_integer(), Some(5000));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = set_value("", "acoustid_api_key", "x").unwrap_err();
        assert!(err.to_string().contains("Valid keys"));
    }

    #[test]
    fn test_lookup_every_key() {
        let config = Config::default();
        for key in KEYS {
            assert!(lookup(&config, key).is_some(), "{key}");
        }
        assert!(lookup(&config, "nope").is_none());
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(None), "<not set>");
        assert_eq!(mask(Some("abc")), "****");
        assert_eq!(mask(Some("AIzaSyExample")), "AIza****");
    }
}
