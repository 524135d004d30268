//! YAML pipeline configuration.
//!
//! Everything the classifier needs besides the keyword set lives in one YAML
//! file: the embedder settings, the similarity threshold, the confidence
//! bucket boundaries, and how keyword sources are read.
//!
//! ```yaml
//! version: "1.0"
//!
//! semantic:
//!   mode: "onnx"
//!   model_name: "vinai/phobert-base"
//!   model_path: "models/phobert-base/model.onnx"
//!   tokenizer_path: "models/phobert-base/tokenizer.json"
//!   max_sequence_length: 256
//!   hidden_size: 768
//!   segmenter: "auto"
//!
//! classify_threshold: 0.3
//! very_high_threshold: 0.7
//! high_threshold: 0.6
//! label_locale: "vi"
//!
//! keyword_source:
//!   drop_first_data_row: false
//! ```

use std::fs;
use std::path::Path;

use semantic::EmbedderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{BucketThresholds, LabelLocale};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Embedder settings
    #[serde(default)]
    pub semantic: EmbedderConfig,

    /// Minimum cosine score a department needs to be reported at all
    #[serde(default = "default_classify_threshold")]
    pub classify_threshold: f32,

    /// Scores strictly above this land in the "very high" bucket
    #[serde(default = "default_very_high")]
    pub very_high_threshold: f64,

    /// Scores strictly above this (and not very high) land in the "high" bucket
    #[serde(default = "default_high")]
    pub high_threshold: f64,

    #[serde(default)]
    pub label_locale: LabelLocale,

    #[serde(default)]
    pub keyword_source: KeywordSourceConfig,
}

/// How a keyword table is turned into a keyword set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordSourceConfig {
    /// Discard the first non-empty cell of every column. Some keyword sheets
    /// carry a sub-header row directly under the department names.
    #[serde(default)]
    pub drop_first_data_row: bool,
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check versions, thresholds, and the embedder section.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        for (name, value) in [
            ("classify_threshold", f64::from(self.classify_threshold)),
            ("very_high_threshold", self.very_high_threshold),
            ("high_threshold", self.high_threshold),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ConfigLoadError::Validation(format!(
                    "{name} must be within [-1, 1], got {value}"
                )));
            }
        }

        if self.high_threshold > self.very_high_threshold {
            return Err(ConfigLoadError::Validation(
                "high_threshold must not exceed very_high_threshold".to_string(),
            ));
        }

        self.semantic
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))
    }

    pub fn bucket_thresholds(&self) -> BucketThresholds {
        BucketThresholds {
            very_high: self.very_high_threshold,
            high: self.high_threshold,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            semantic: EmbedderConfig::default(),
            classify_threshold: default_classify_threshold(),
            very_high_threshold: default_very_high(),
            high_threshold: default_high(),
            label_locale: LabelLocale::default(),
            keyword_source: KeywordSourceConfig::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
fn default_classify_threshold() -> f32 {
    0.3
}
fn default_very_high() -> f64 {
    0.70
}
fn default_high() -> f64 {
    0.60
}
