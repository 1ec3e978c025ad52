//! Configuration management

pub mod commands;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::UnitId;
use crate::mt::apertium::DEFAULT_API_BASE;
use crate::server::client::{HttpApiConfig, Scope};

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_FILE_NAME: &str = "state.json";
const APP_NAME: &str = "ptl-editor";
const SESSION_ENV: &str = "PTL_SESSION";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tm: TmConfig,

    #[serde(default)]
    pub mt: MtConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub verbose: bool,
    /// Where the fragment is kept between runs
    #[serde(default)]
    pub state_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Store path such as `/fr/project/file.po`
    #[serde(default)]
    pub store: Option<String>,

    /// Directory path such as `/fr/project/`, used when no store is set
    #[serde(default)]
    pub directory: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Session cookie of a logged in user
    #[serde(default)]
    pub session: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            store: None,
            directory: None,
            timeout_secs: default_timeout(),
            session: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TmConfig {
    /// Base of the translation memory service, e.g. `http://localhost:8888/tmserver/`
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtConfig {
    /// Enabled machine translation providers (google, apertium)
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    #[serde(default = "default_apertium_base")]
    pub apertium_api_base: String,

    #[serde(default = "default_mt_timeout")]
    pub timeout_secs: u64,
}

fn default_providers() -> Vec<String> {
    vec!["google".to_string()]
}

fn default_apertium_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_mt_timeout() -> u64 {
    10
}

impl Default for MtConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            apertium_api_base: default_apertium_base(),
            timeout_secs: default_mt_timeout(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Load config from default location
    pub fn load() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config path")?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<PathBuf> {
        let dir = Self::config_dir().context("Could not determine config directory")?;
        let path = dir.join(CONFIG_FILE_NAME);
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Session cookie, falling back to the environment
    pub fn session(&self) -> Option<String> {
        self.server
            .session
            .clone()
            .or_else(|| std::env::var(SESSION_ENV).ok())
    }

    pub fn scope(&self) -> Result<Scope> {
        match (&self.server.store, &self.server.directory) {
            (Some(store), _) => Ok(Scope::Store(store.trim_end_matches('/').to_string())),
            (None, Some(dir)) => {
                let dir = if dir.ends_with('/') {
                    dir.clone()
                } else {
                    format!("{}/", dir)
                };
                Ok(Scope::Directory(dir))
            }
            (None, None) => anyhow::bail!(
                "Nothing to edit: set server.store or server.directory (ptl-editor config set server.store /fr/project/file.po)"
            ),
        }
    }

    pub fn api_config(&self, base_url_override: Option<&str>) -> Result<HttpApiConfig> {
        let base_url = base_url_override.unwrap_or(&self.server.base_url);
        Ok(HttpApiConfig::new(base_url, self.scope()?)
            .with_tm_url(self.tm.url.clone())
            .with_session(self.session())
            .with_timeout(Some(self.server.timeout_secs)))
    }

    pub fn state_path(&self) -> Option<PathBuf> {
        match self.general.state_file {
            Some(ref file) => Some(PathBuf::from(file)),
            None => dirs::data_dir().map(|p| p.join(APP_NAME).join(STATE_FILE_NAME)),
        }
    }
}

/// What survives between two runs of the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    #[serde(default)]
    pub fragment: String,
    #[serde(default)]
    pub suggest_mode: bool,
    /// Context gap reached on the unit that was left active
    #[serde(default)]
    pub context: Option<SavedContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedContext {
    pub uid: UnitId,
    pub gap: u32,
}

impl SavedState {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .context(format!("Failed to read state file: {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse state file")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create state directory")?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write state file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nstore = \"/fr/tutorial/tut.po\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.mt.providers, vec!["google"]);
        assert_eq!(config.scope().unwrap(), Scope::Store("/fr/tutorial/tut.po".into()));
    }

    #[test]
    fn test_directory_scope_gets_trailing_slash() {
        let mut config = Config::default();
        config.server.directory = Some("/fr/tutorial".into());
        assert_eq!(config.scope().unwrap(), Scope::Directory("/fr/tutorial/".into()));
    }

    #[test]
    fn test_missing_scope_is_an_error() {
        assert!(Config::default().scope().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.tm.url = Some("http://tm.example/".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.tm.url.as_deref(), Some("http://tm.example/"));
    }

    #[test]
    fn test_saved_state_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = SavedState::load(&dir.path().join("state.json")).unwrap();
        assert_eq!(state, SavedState::default());
    }

    #[test]
    fn test_saved_state_keeps_context_gap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = SavedState {
            fragment: "unit=12".into(),
            suggest_mode: false,
            context: Some(SavedContext { uid: 12, gap: 6 }),
        };
        state.save(&path).unwrap();
        assert_eq!(SavedState::load(&path).unwrap(), state);
    }

    #[test]
    fn test_saved_state_without_context_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"fragment": "page=2", "suggest_mode": true}"#).unwrap();
        let state = SavedState::load(&path).unwrap();
        assert_eq!(state.fragment, "page=2");
        assert!(state.context.is_none());
    }
}
