// WHY: Partial TOML files override only the keys they name; every section
// falls back to the defaults the tool shipped with

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AbbrevError, Result};
use crate::patterns::PatternParams;

/// Default maximum length when a request does not specify one
pub const DEFAULT_TARGET_LENGTH: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub abbreviation: AbbreviationConfig,
    pub dictionary: DictionaryConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbbreviationConfig {
    pub target_length: usize,
    pub use_ml: bool,
    /// Truncation never keeps fewer characters than this (hard floor 2)
    pub min_truncation_length: usize,
    /// Ranker choices below this confidence fall back to the fixed rule
    pub min_confidence: f64,
}

impl Default for AbbreviationConfig {
    fn default() -> Self {
        Self {
            target_length: DEFAULT_TARGET_LENGTH,
            use_ml: true,
            min_truncation_length: 4,
            min_confidence: 0.5,
        }
    }
}

impl AbbreviationConfig {
    pub fn pattern_params(&self) -> PatternParams {
        PatternParams::new(self.min_truncation_length)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    pub path: PathBuf,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("data/abbreviations.json") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Versioned model index; trained models are saved next to it
    pub registry_path: PathBuf,
    /// Unversioned model files used when the registry has no usable active entry
    pub basic_path: PathBuf,
    pub hybrid_path: PathBuf,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("models/model_registry.json"),
            basic_path: PathBuf::from("models/basic.json"),
            hybrid_path: PathBuf::from("models/hybrid.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: true }
    }
}

impl AppConfig {
    /// Load configuration; `None` yields defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    AbbrevError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AbbrevError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.abbreviation.target_length == 0 {
            return Err(AbbrevError::Config("abbreviation.target_length must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.abbreviation.min_confidence) {
            return Err(AbbrevError::Config(format!(
                "abbreviation.min_confidence must be within [0, 1], got {}",
                self.abbreviation.min_confidence
            )));
        }
        Ok(())
    }
}
