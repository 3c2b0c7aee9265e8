//! Configuration management for skope-session.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SessionError};

/// Command-line arguments for skope-session
#[derive(Parser, Debug)]
#[command(name = "skope-session")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset id to open
    pub dataset: String,

    /// Path to the JSON dataset catalog
    #[arg(short = 'C', long, env = "SKOPE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Variable to select instead of the dataset's first one
    #[arg(short, long)]
    pub variable: Option<String>,

    /// Path to a GeoJSON file with the study area
    #[arg(short, long)]
    pub geometry: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "SKOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Time-series request timeout in seconds
    #[arg(long, env = "SKOPE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SKOPE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Defaults for a fresh session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Temporal range used until a dataset sets one
    #[serde(default = "default_temporal_range")]
    pub default_temporal_range: [i32; 2],

    /// Area covered by one raster pixel, in square meters
    #[serde(default = "default_area_per_pixel")]
    pub area_per_pixel: f64,
}

/// Time-series retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Time budget for one request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the JSON dataset catalog
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args))
    }

    /// Build the configuration for already-parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if args.catalog.is_some() {
            config.catalog.path = args.catalog.clone();
        }
        if let Some(timeout_secs) = args.timeout_secs {
            config.retrieval.timeout_secs = timeout_secs;
        }
        config.log_level = args.log_level.clone();

        Ok(config)
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.session = other.session;
        self.retrieval = other.retrieval;
        if other.catalog.path.is_some() {
            self.catalog.path = other.catalog.path;
        }
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let [start, end] = self.session.default_temporal_range;
        if start > end {
            return Err(SessionError::Config {
                message: format!(
                    "Default temporal range is inverted: [{}, {}]",
                    start, end
                ),
            });
        }

        if !(self.session.area_per_pixel.is_finite() && self.session.area_per_pixel > 0.0) {
            return Err(SessionError::Config {
                message: format!(
                    "Area per pixel must be a positive number, got {}",
                    self.session.area_per_pixel
                ),
            });
        }

        if self.retrieval.timeout_secs == 0 {
            return Err(SessionError::Config {
                message: "Retrieval timeout cannot be 0".to_string(),
            });
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(SessionError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            retrieval: RetrievalConfig::default(),
            catalog: CatalogConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_temporal_range: default_temporal_range(),
            area_per_pixel: default_area_per_pixel(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Default value functions for serde
fn default_temporal_range() -> [i32; 2] {
    [1, 2000]
}

fn default_area_per_pixel() -> f64 {
    45.8
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
