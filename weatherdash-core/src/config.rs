use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// City fetched when the dashboard opens.
pub const DEFAULT_CITY: &str = "Kolkata";

/// How out-of-order fetch completions are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StaleFetchPolicy {
    /// Whichever fetch resolves last replaces the snapshot.
    #[default]
    LastResolved,
    /// Completions older than the last applied request are discarded.
    LatestRequest,
}

/// Source for the "use my location" action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub enabled: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: None,
            longitude: None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Kolkata"
/// auto_refresh = true
/// stale_fetches = "last-resolved"
///
/// [location]
/// latitude = 22.57
/// longitude = 88.36
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Override for the forecast API host.
    pub base_url: Option<String>,

    pub default_city: String,

    pub auto_refresh: bool,

    pub stale_fetches: StaleFetchPolicy,

    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_city: DEFAULT_CITY.to_string(),
            auto_refresh: true,
            stale_fetches: StaleFetchPolicy::default(),
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `weatherdash configure` and enter your OpenWeather API key."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(path)
    }

    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
