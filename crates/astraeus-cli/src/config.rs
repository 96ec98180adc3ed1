//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for astraeus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub endpoint: Option<String>,
    /// Default dataset to query (par, dfr)
    pub dataset: Option<String>,
    /// Whether to print rendered markup after each completed answer
    pub markup: Option<bool>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("astraeus")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for ASTRAEUS_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("ASTRAEUS_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        let dir = path.parent().unwrap();
        fs::create_dir_all(dir)?;

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            endpoint: Some("http://localhost:8000".to_string()),
            dataset: Some("par".to_string()),
            markup: Some(false),
        };

        default_config.save()?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# astraeus configuration file
# Place at ~/.config/astraeus/config.toml (Linux/Mac) or %APPDATA%\astraeus\config.toml (Windows)

# Backend base URL
endpoint = "http://localhost:8000"

# Default dataset to query (par, dfr)
dataset = "par"

# Print the rendered markup after each completed answer
markup = false
"#
}
