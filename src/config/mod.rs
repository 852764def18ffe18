use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the per-project config file, looked up in the project root.
pub const CONFIG_FILE: &str = "tagstamp.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Asset database location, relative to the project root.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Where a new version record is created when the project has none.
    #[serde(default = "default_record_path")]
    pub record_path: String,

    /// chrono format string for `build_timestamp`. Rendered in UTC.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub settings: SettingsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitConfig {
    /// git executable. Default: "git"
    #[serde(default = "default_git_program")]
    pub program: String,

    /// Abbreviate the commit hash to this many characters. Default: full hash
    #[serde(default)]
    pub hash_length: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    /// Project settings file that receives the version string.
    #[serde(default = "default_settings_path")]
    pub path: PathBuf,

    /// Dotted key paths set to the version string.
    #[serde(default = "default_settings_fields")]
    pub fields: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: default_database(),
            record_path: default_record_path(),
            timestamp_format: default_timestamp_format(),
            git: GitConfig::default(),
            settings: SettingsConfig::default(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            program: default_git_program(),
            hash_length: None,
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        SettingsConfig {
            path: default_settings_path(),
            fields: default_settings_fields(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from(".tagstamp").join("assets.db")
}

fn default_record_path() -> String {
    "Assets/Version/Version.asset".to_string()
}

pub fn default_timestamp_format() -> String {
    "%Y %B %d - %H:%M".to_string()
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("ProjectSettings").join("ProjectSettings.toml")
}

fn default_settings_fields() -> Vec<String> {
    vec![
        "player.bundle_version".to_string(),
        "player.macos.build_number".to_string(),
    ]
}

impl Config {
    pub fn database_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.database)
    }

    pub fn settings_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.settings.path)
    }
}

/// Load `tagstamp.toml` from the project root (or return defaults if it doesn't exist)
pub fn load(project_dir: &Path) -> Result<Config> {
    let path = project_dir.join(CONFIG_FILE);
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}
