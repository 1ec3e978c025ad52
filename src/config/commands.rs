//! Config command handlers

use anyhow::{Context, Result};
use colored::Colorize;

use super::Config;
use crate::cli::{ConfigAction, ConfigArgs};

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(),
        ConfigAction::Init { force } => init_config(force),
        ConfigAction::Set { key, value } => set_config(&key, &value),
        ConfigAction::Get { key } => get_config(&key),
        ConfigAction::Path => show_path(),
        ConfigAction::Edit => edit_config(),
    }
}

fn show_config() -> Result<()> {
    let mut config = Config::load()?;
    config.server.session = config.server.session.map(|s| mask_key(&s));
    let content = toml::to_string_pretty(&config)?;

    println!("{}", "[Config]".green());
    println!("{}", content);

    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() && !force {
        println!(
            "{}",
            format!("Config file already exists: {}", path.display()).yellow()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config::default();
    let saved_path = config.save()?;

    println!("{}", "[Config] Initialized".green());
    println!("  Created: {}", saved_path.display());
    println!();
    println!("Point the editor at a store to start translating:");
    println!("  ptl-editor config set server.store /fr/project/file.po");

    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Applies `key = value` to a loaded config
pub fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = value.parse().unwrap_or(false),
        ["general", "state_file"] => config.general.state_file = optional(value),
        ["server", "base_url"] => config.server.base_url = value.to_string(),
        ["server", "store"] => config.server.store = optional(value),
        ["server", "directory"] => config.server.directory = optional(value),
        ["server", "timeout_secs"] => {
            config.server.timeout_secs = value
                .parse()
                .context(format!("Invalid timeout: {}", value))?
        }
        ["server", "session"] => config.server.session = optional(value),
        ["tm", "url"] => config.tm.url = optional(value),
        ["mt", "providers"] => {
            config.mt.providers = value
                .split(',')
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect()
        }
        ["mt", "apertium_api_base"] => config.mt.apertium_api_base = value.to_string(),
        ["mt", "timeout_secs"] => {
            config.mt.timeout_secs = value
                .parse()
                .context(format!("Invalid timeout: {}", value))?
        }
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    Ok(())
}

/// Display value of `key`, `None` when unset
pub fn lookup_setting(config: &Config, key: &str) -> Result<Option<String>> {
    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["general", "verbose"] => Some(config.general.verbose.to_string()),
        ["general", "state_file"] => config.general.state_file.clone(),
        ["server", "base_url"] => Some(config.server.base_url.clone()),
        ["server", "store"] => config.server.store.clone(),
        ["server", "directory"] => config.server.directory.clone(),
        ["server", "timeout_secs"] => Some(config.server.timeout_secs.to_string()),
        ["server", "session"] => config.server.session.as_deref().map(mask_key),
        ["tm", "url"] => config.tm.url.clone(),
        ["mt", "providers"] => Some(config.mt.providers.join(",")),
        ["mt", "apertium_api_base"] => Some(config.mt.apertium_api_base.clone()),
        ["mt", "timeout_secs"] => Some(config.mt.timeout_secs.to_string()),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    };

    Ok(value)
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    apply_setting(&mut config, key, value)?;
    config.save()?;
    println!("{}", format!("[Config] Set {} = {}", key, value).green());

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;

    match lookup_setting(&config, key)? {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{} = (not set)", key),
    }

    Ok(())
}

fn show_path() -> Result<()> {
    match Config::config_path() {
        Some(path) => {
            println!("{}", path.display());
            if path.exists() {
                println!("{}", "(exists)".green());
            } else {
                println!("{}", "(not created)".yellow());
            }
        }
        None => {
            println!("{}", "Could not determine config path".red());
        }
    }
    Ok(())
}

fn edit_config() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    // Create default config if it doesn't exist
    if !path.exists() {
        let config = Config::default();
        config.save()?;
        println!("{}", "[Config] Created default config".green());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening config with: {}", editor);
    println!("Path: {}", path.display());

    std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .context(format!("Failed to open editor: {}", editor))?;

    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_round_trip_keys() {
        let mut config = Config::default();
        apply_setting(&mut config, "server.store", "/fr/tutorial/tut.po").unwrap();
        apply_setting(&mut config, "mt.providers", "Google, apertium").unwrap();
        apply_setting(&mut config, "server.timeout_secs", "5").unwrap();

        assert_eq!(
            lookup_setting(&config, "server.store").unwrap().as_deref(),
            Some("/fr/tutorial/tut.po")
        );
        assert_eq!(config.mt.providers, vec!["google", "apertium"]);
        assert_eq!(config.server.timeout_secs, 5);
    }

    #[test]
    fn test_empty_value_unsets() {
        let mut config = Config::default();
        apply_setting(&mut config, "tm.url", "http://tm/").unwrap();
        apply_setting(&mut config, "tm.url", "").unwrap();
        assert_eq!(lookup_setting(&config, "tm.url").unwrap(), None);
    }

    #[test]
    fn test_unknown_key() {
        let mut config = Config::default();
        assert!(apply_setting(&mut config, "api.openai_api_key", "x").is_err());
        assert!(lookup_setting(&config, "nope").is_err());
        assert!(apply_setting(&mut config, "server.timeout_secs", "soon").is_err());
    }

    #[test]
    fn test_session_is_masked() {
        let mut config = Config::default();
        apply_setting(&mut config, "server.session", "abcdef0123456789").unwrap();
        assert_eq!(
            lookup_setting(&config, "server.session").unwrap().as_deref(),
            Some("abcd...6789")
        );
    }
}
