//! `dinheiro.toml` configuration. Every key is optional.
use crate::error::DinheiroError;
use crate::error::ResultMessage;
use crate::quotes::panorama::default_panels;
use crate::quotes::panorama::PanelSpec;
use crate::quotes::yahoo::DEFAULT_BASE_URL;
use crate::spreadsheet::Criteria;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dinheiro.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown quote provider '{0}', expected 'yahoo' or 'none'")]
    UnknownProvider(String),

    #[error("Invalid value for '{0}': {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteProvider {
    Yahoo,
    None,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sheet: SheetConfig,
    pub quotes: QuotesConfig,
    pub panorama: PanoramaConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Glob patterns selecting candidate sheets
    pub patterns: Vec<String>,
    /// Files tried in order when no input is given
    pub fallback_files: Vec<String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            patterns: vec!["*".to_owned()],
            fallback_files: vec!["PEC.xlsx".to_owned(), "PEC - Página1.csv".to_owned()],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuotesConfig {
    pub provider: String,
    pub base_url: String,
    pub symbol_suffix: String,
    pub timeout_seconds: u64,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        QuotesConfig {
            provider: "yahoo".to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            symbol_suffix: ".SA".to_owned(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanoramaConfig {
    pub enabled: bool,
    pub panels: Vec<PanelSpec>,
}

impl Default for PanoramaConfig {
    fn default() -> Self {
        PanoramaConfig {
            enabled: true,
            panels: default_panels(),
        }
    }
}

impl Config {
    /// Loads configuration.
    ///
    /// An explicit `path` must exist. Without one, `dinheiro.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, DinheiroError> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No configuration file, using defaults");
                return Ok(Config::default());
            }
        };
        let prefix = format!("Failed to load configuration '{}'", path.display());
        Self::read(path).with_prefix(&prefix)
    }

    fn read(path: &Path) -> Result<Self, DinheiroError> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parses and validates TOML text
    pub fn parse(content: &str) -> Result<Self, DinheiroError> {
        let config: Config = toml::from_str(content)?;
        config.quote_provider()?;
        if config.quotes.timeout_seconds == 0 {
            Err(ConfigError::InvalidValue("quotes.timeout_seconds", "must be positive".to_owned()))?;
        }
        config.criteria()?;
        Ok(config)
    }

    pub fn quote_provider(&self) -> Result<QuoteProvider, ConfigError> {
        match self.quotes.provider.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(QuoteProvider::Yahoo),
            "none" => Ok(QuoteProvider::None),
            _ => Err(ConfigError::UnknownProvider(self.quotes.provider.to_owned())),
        }
    }

    pub fn criteria(&self) -> Result<Criteria, DinheiroError> {
        Criteria::from_patterns(self.sheet.patterns.as_slice())
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_secs(self.quotes.timeout_seconds)
    }
}
