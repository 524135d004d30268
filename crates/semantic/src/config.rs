use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SemanticError;

/// Which encoder backs the embedder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EncoderMode {
    /// Local ONNX inference over a pretrained transformer encoder.
    Onnx,
    /// Deterministic hash-derived token vectors. No model files required.
    Stub,
}

/// Word segmentation strategy applied before the subword tokenizer runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SegmenterKind {
    /// Pick the best segmenter compiled into this build.
    Auto,
    /// Unicode word boundaries (UAX #29).
    Unicode,
    /// Lowercase then split on whitespace.
    Whitespace,
}

/// Runtime configuration describing which model/tokenizer to use and how text is segmented.
///
/// # Example
/// ```no_run
/// use semantic::{Embedder, EmbedderConfig, EncoderMode};
///
/// # async fn run() -> Result<(), semantic::SemanticError> {
/// let cfg = EmbedderConfig {
///     mode: EncoderMode::Stub,
///     ..Default::default()
/// };
/// let embedder = Embedder::from_config(&cfg).await?;
/// let tokens = embedder.embed("Thông tin về học phí")?;
/// assert_eq!(tokens.dim(), cfg.hidden_size);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedderConfig {
    /// Encoder backend.
    pub mode: EncoderMode,
    /// Friendly label surfaced in logs.
    pub model_name: String,
    /// Local path where the ONNX file should live (also used as the download target when
    /// [`model_url`](Self::model_url) is provided).
    pub model_path: PathBuf,
    /// Optional HTTPS URL downloaded when [`model_path`](Self::model_path) is missing.
    pub model_url: Option<String>,
    /// Path to `tokenizer.json`. When absent and [`tokenizer_url`](Self::tokenizer_url) is provided we
    /// infer the filename from the URL and place it next to the model file.
    pub tokenizer_path: Option<PathBuf>,
    /// Optional HTTPS URL for fetching the tokenizer on-demand.
    pub tokenizer_url: Option<String>,
    /// Hard cap on encoder input length; longer inputs are truncated.
    pub max_sequence_length: usize,
    /// Width of every token vector (the encoder's hidden size).
    pub hidden_size: usize,
    /// Word segmentation strategy.
    pub segmenter: SegmenterKind,
    /// Use the stub encoder when ONNX assets are absent locally and no URL is
    /// configured. Off by default: stub vectors carry no meaning, so this is
    /// only for offline development.
    pub fallback_to_stub: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            mode: EncoderMode::Onnx,
            model_name: "vinai/phobert-base".into(),
            model_path: PathBuf::from("./models/phobert-base/onnx/model.onnx"),
            model_url: None,
            tokenizer_path: Some(PathBuf::from("./models/phobert-base/tokenizer.json")),
            tokenizer_url: None,
            max_sequence_length: 256,
            hidden_size: 768,
            segmenter: SegmenterKind::Auto,
            fallback_to_stub: false,
        }
    }
}

impl EmbedderConfig {
    /// Reject settings the encoder cannot run with.
    pub fn validate(&self) -> Result<(), SemanticError> {
        if self.hidden_size == 0 {
            return Err(SemanticError::InvalidConfig(
                "hidden_size must be greater than zero".into(),
            ));
        }
        // Room for the two special tokens plus at least one word.
        if self.max_sequence_length < 3 {
            return Err(SemanticError::InvalidConfig(format!(
                "max_sequence_length {} is too small",
                self.max_sequence_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = EmbedderConfig::default();
        assert_eq!(cfg.mode, EncoderMode::Onnx);
        assert_eq!(cfg.model_name, "vinai/phobert-base");
        assert_eq!(cfg.max_sequence_length, 256);
        assert_eq!(cfg.hidden_size, 768);
        assert_eq!(cfg.segmenter, SegmenterKind::Auto);
        assert!(!cfg.fallback_to_stub);
        assert!(cfg.model_url.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_hidden_size() {
        let cfg = EmbedderConfig {
            hidden_size: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(SemanticError::InvalidConfig(_))));
    }

    #[test]
    fn config_rejects_tiny_sequence_length() {
        let cfg = EmbedderConfig {
            max_sequence_length: 2,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_partial_json_uses_defaults() {
        let cfg: EmbedderConfig =
            serde_json::from_str(r#"{"mode": "stub", "segmenter": "whitespace"}"#).unwrap();
        assert_eq!(cfg.mode, EncoderMode::Stub);
        assert_eq!(cfg.segmenter, SegmenterKind::Whitespace);
        assert_eq!(cfg.hidden_size, 768);
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = EmbedderConfig {
            mode: EncoderMode::Stub,
            model_name: "custom".into(),
            model_path: PathBuf::from("/tmp/model.onnx"),
            model_url: Some("https://example.com/model.onnx".into()),
            tokenizer_path: None,
            tokenizer_url: Some("https://example.com/tokenizer.json".into()),
            max_sequence_length: 128,
            hidden_size: 32,
            segmenter: SegmenterKind::Unicode,
            fallback_to_stub: true,
        };
        let serialized = serde_json::to_string(&cfg).unwrap();
        let deserialized: EmbedderConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }
}
