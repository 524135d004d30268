use std::io;
use thiserror::Error;

/// Errors surfaced while building or running the text embedder.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// The ONNX model could not be located locally and no fallback URL was provided.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing and there was no remote URL to fetch it from.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// Configuration is inconsistent (e.g., zero hidden size).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Unable to download remote assets.
    #[error("download failed: {0}")]
    Download(String),
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The tokenizer rejected the input text.
    #[error("tokenization failure: {0}")]
    Tokenization(String),
    /// ONNX Runtime failures or malformed model outputs.
    #[error("inference failure: {0}")]
    Inference(String),
    /// The encoder produced vectors of an unexpected width.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl Clone for SemanticError {
    fn clone(&self) -> Self {
        match self {
            SemanticError::ModelNotFound(s) => SemanticError::ModelNotFound(s.clone()),
            SemanticError::TokenizerMissing(s) => SemanticError::TokenizerMissing(s.clone()),
            SemanticError::InvalidConfig(s) => SemanticError::InvalidConfig(s.clone()),
            SemanticError::Download(s) => SemanticError::Download(s.clone()),
            SemanticError::Io(e) => SemanticError::Io(io::Error::new(e.kind(), e.to_string())),
            SemanticError::Tokenization(s) => SemanticError::Tokenization(s.clone()),
            SemanticError::Inference(s) => SemanticError::Inference(s.clone()),
            SemanticError::DimensionMismatch { expected, actual } => {
                SemanticError::DimensionMismatch {
                    expected: *expected,
                    actual: *actual,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_model_not_found() {
        let err = SemanticError::ModelNotFound("/models/phobert/model.onnx".into());
        assert!(err.to_string().contains("model file not found"));
        assert!(err.to_string().contains("/models/phobert/model.onnx"));
    }

    #[test]
    fn error_tokenization() {
        let err = SemanticError::Tokenization("sequence too long".into());
        assert_eq!(err.to_string(), "tokenization failure: sequence too long");
    }

    #[test]
    fn error_dimension_mismatch() {
        let err = SemanticError::DimensionMismatch {
            expected: 768,
            actual: 384,
        };
        assert!(err.to_string().contains("expected 768"));
        assert!(err.to_string().contains("got 384"));
    }

    #[test]
    fn error_from_io_keeps_kind_on_clone() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SemanticError = io_err.into();
        match err.clone() {
            SemanticError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected clone result: {other:?}"),
        }
    }
}
