use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli::OutputFormat;
use crate::client::DEFAULT_API_BASE_URL;
use crate::transcript::DEFAULT_LANGUAGE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// YouTube access settings
    pub youtube: YoutubeConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// YouTube Data API v3 key, needed for playlists and channels
    pub api_key: Option<String>,

    /// Root of the YouTube Data API
    pub api_base_url: String,

    /// Netscape cookies.txt sent with watch page requests
    pub cookies_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language codes tried when none are given
    pub default_languages: Vec<String>,

    /// Default output format
    pub default_output_format: String,

    /// Abort a playlist or channel batch on the first failed video
    pub stop_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YoutubeConfig {
                api_key: None,
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                cookies_path: None,
            },
            app: AppConfig {
                default_languages: vec![DEFAULT_LANGUAGE.to_string()],
                default_output_format: "text".to_string(),
                stop_on_error: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("youtube-transcript").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = Url::parse(&self.youtube.api_base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.youtube.api_base_url))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("API base URL must use HTTP or HTTPS protocol");
        }

        if self.app.default_languages.iter().any(|code| code.trim().is_empty()) {
            anyhow::bail!("Default language codes cannot be blank");
        }

        self.output_format()?;

        Ok(())
    }

    /// Configured default output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.app
            .default_output_format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow::anyhow!("Invalid default output format: {}", e))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!(
            "  API Key: {}",
            if self.youtube.api_key.is_some() { "configured" } else { "not set" }
        );
        println!("  API Base URL: {}", self.youtube.api_base_url);
        if let Some(cookies) = &self.youtube.cookies_path {
            println!("  Cookies File: {}", cookies.display());
        }
        println!("  Default Languages: {}", self.app.default_languages.join(", "));
        println!("  Default Format: {}", self.app.default_output_format);
        println!("  Stop On Error: {}", self.app.stop_on_error);
    }
}
