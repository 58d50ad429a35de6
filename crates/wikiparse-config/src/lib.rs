//! Wikiparse Config
//!
//! This crate handles configuration loading and management
//! for wikiparse, supporting TOML configuration files.
//!
//! # Overview
//!
//! Configuration is loaded from platform-specific locations:
//! - Linux: `~/.config/wikiparse/config.toml`
//! - macOS: `~/Library/Application Support/wikiparse/config.toml`
//! - Windows: `%APPDATA%\wikiparse\config.toml`
//!
//! # Example
//!
//! ```no_run
//! use wikiparse_config::Config;
//!
//! // Load config with defaults
//! let config = Config::load().unwrap();
//!
//! // Or load with an override file
//! let config = Config::load_with_override(Some("./custom.toml")).unwrap();
//! let parser_config = config.parser_config();
//! ```

mod buffer;
mod features;

pub use buffer::{BufferConfig, DEFAULT_MARKERS, DEFAULT_SIZE};
pub use features::FeaturesConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wikiparse_core::{ParserConfig, Result, WikiError};

/// Default TOML configuration string.
const DEFAULT_TOML: &str = r#"[features]
Additions = false
BlogStyle = false
Monospace = false

[buffer]
Size    = 32768
Markers = 32
"#;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Feature toggles
    #[serde(default)]
    pub features: FeaturesConfig,

    /// Streaming buffer sizing
    #[serde(default)]
    pub buffer: BufferConfig,
}

impl Config {
    /// Returns the default TOML configuration string.
    ///
    /// # Example
    ///
    /// ```
    /// use wikiparse_config::Config;
    /// let toml = Config::default_toml();
    /// assert!(toml.contains("[features]"));
    /// assert!(toml.contains("[buffer]"));
    /// ```
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }

    /// Returns the platform-specific configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns the platform-specific configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "wikiparse")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Load configuration from the default platform-specific path.
    ///
    /// If no config file exists, returns the default configuration.
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            WikiError::Config(format!("Parse error in {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with an optional override file or string.
    ///
    /// 1. Load the base config from the default location
    /// 2. If `override_config` is provided:
    ///    - If it's a path to an existing file, load and merge it
    ///    - Otherwise, treat it as a TOML string and parse it
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wikiparse_config::Config;
    ///
    /// let config = Config::load_with_override(Some("[features]\nAdditions = true")).unwrap();
    /// assert!(config.features.additions);
    /// ```
    pub fn load_with_override(override_config: Option<&str>) -> Result<Self> {
        let mut config = Self::load()?;

        if let Some(override_str) = override_config {
            let override_path = Path::new(override_str);

            let override_toml = if override_path.exists() {
                std::fs::read_to_string(override_path)?
            } else {
                override_str.to_string()
            };

            let override_config: Config = toml::from_str(&override_toml)
                .map_err(|e| WikiError::Config(format!("Override parse error: {}", e)))?;

            config.merge(&override_config);
            config.validate()?;
        }

        Ok(config)
    }

    /// Merge another config into this one.
    ///
    /// Values from `other` take precedence over values in `self`.
    ///
    /// # Example
    ///
    /// ```
    /// use wikiparse_config::Config;
    ///
    /// let mut base = Config::default();
    /// let override_config: Config = toml::from_str(r#"
    ///     [features]
    ///     Monospace = true
    /// "#).unwrap();
    ///
    /// base.merge(&override_config);
    /// assert!(base.features.monospace);
    /// ```
    pub fn merge(&mut self, other: &Config) {
        self.features.merge(&other.features);
        self.buffer.merge(&other.buffer);
    }

    /// Reject values no parser can work with.
    pub fn validate(&self) -> Result<()> {
        if self.buffer.size == 0 {
            return Err(WikiError::Config("buffer Size must be at least 1".into()));
        }
        Ok(())
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| WikiError::Config(format!("Serialization error: {}", e)))?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// The scanner configuration described by this file.
    pub fn parser_config(&self) -> ParserConfig {
        self.features.parser_config()
    }
}
