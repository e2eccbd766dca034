use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Playback sources keyed by `"{show}-{season}-{episode}"`
    #[serde(default = "default_sources")]
    pub sources: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Initial volume, 0-100
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,
    #[serde(default)]
    pub auto_advance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_catalog_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_player_command() -> String {
    "mpv".to_string()
}

fn default_volume() -> u8 {
    100
}

fn default_skip_seconds() -> f64 {
    10.0
}

fn default_accent_color() -> String {
    "magenta".to_string()
}

fn default_share_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_sources() -> BTreeMap<String, String> {
    const SAMPLES: &str = "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample";

    [
        ("123249-1-1", "ForBiggerBlazes.mp4"),
        ("85937-1-1", "ForBiggerEscapes.mp4"),
        ("1429-1-1", "ForBiggerJoyrides.mp4"),
    ]
    .into_iter()
    .map(|(key, file)| (key.to_string(), format!("{}/{}", SAMPLES, file)))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            player: PlayerConfig::default(),
            ui: UiConfig::default(),
            sources: default_sources(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            base_url: default_catalog_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: Vec::new(),
            volume: default_volume(),
            skip_seconds: default_skip_seconds(),
            auto_advance: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
            share_base_url: default_share_base_url(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "anistream").ok_or(Error::NoConfigDir)
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "anistream")
        .map(|d| d.data_dir().to_path_buf())
        .ok_or(Error::NoDataDir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load from `path`, writing defaults there first if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.override_api_key(key);
        }

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn override_api_key(&mut self, key: String) {
        let key = key.trim();
        if !key.is_empty() {
            self.catalog.api_key = key.to_string();
        }
    }

    /// Initial volume as a fraction in [0, 1]
    pub fn initial_volume(&self) -> f64 {
        f64::from(self.player.volume.min(100)) / 100.0
    }
}
