use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::view::{DEFAULT_BUSY_LABEL, DEFAULT_SUBMIT_LABEL};

/// Environment variable that overrides `server.base_url`.
pub const SERVER_URL_ENV: &str = "GAME_CREATOR_SERVER_URL";

/// Main configuration structure for game_creator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where the game creator server lives
    #[serde(default)]
    pub server: ServerConfig,

    /// Terminal display configuration
    #[serde(default)]
    pub ui: UIConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Scheme, host and port of the server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the game creation endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds; unset waits forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Terminal,
    Plain,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UIConfig {
    /// Enable colorful output
    #[serde(default = "default_colorful")]
    pub colorful: bool,

    /// Show a spinner while a request is in flight
    #[serde(default = "default_spinner")]
    pub spinner: bool,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Label of the idle submit control
    #[serde(default = "default_submit_label")]
    pub submit_label: String,

    /// Label while a request is in flight
    #[serde(default = "default_busy_label")]
    pub busy_label: String,
}

fn default_base_url() -> String { "http://127.0.0.1:5000".to_string() }
fn default_endpoint() -> String { "/create_game".to_string() }
fn default_colorful() -> bool { true }
fn default_spinner() -> bool { true }
fn default_submit_label() -> String { DEFAULT_SUBMIT_LABEL.to_string() }
fn default_busy_label() -> String { DEFAULT_BUSY_LABEL.to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            timeout_secs: None,
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        UIConfig {
            colorful: default_colorful(),
            spinner: default_spinner(),
            output_format: OutputFormat::default(),
            submit_label: default_submit_label(),
            busy_label: default_busy_label(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<OutputFormat>,
    pub headless: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    /// Load configuration from command line argument or default locations
    pub fn load(config_path: &Option<String>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env();
        Ok(config)
    }

    fn load_file(config_path: &Option<String>) -> Result<Self> {
        if let Some(path) = config_path {
            let expanded = shellexpand::tilde(path);
            return Self::from_file(expanded.as_ref());
        }

        let default_paths = [
            "game_creator.toml",
            ".game_creator.toml",
            "~/.config/game_creator/config.toml",
        ];

        for path in default_paths {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                match Self::from_file(expanded_path.as_ref()) {
                    Ok(config) => {
                        info!("Loaded config from {}", path);
                        return Ok(config);
                    }
                    Err(e) => warn!("Failed to load config from {}: {:#}", path, e),
                }
            }
        }

        Ok(Self::default())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url.trim().to_string();
            }
        }
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Merge with command-line arguments (CLI args take precedence)
    pub fn merge_with_args(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.server_url {
            self.server.base_url = url.clone();
        }
        if let Some(secs) = overrides.timeout_secs {
            self.server.timeout_secs = Some(secs);
        }
        if let Some(format) = overrides.format {
            self.ui.output_format = format;
        }
        if overrides.headless {
            self.ui.colorful = false;
            self.ui.spinner = false;
        }
    }
}
