use semantic::SemanticError;
use tabular::TabularError;
use thiserror::Error;

/// Errors raised by the classification pipeline.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The texts file lacks a required column.
    #[error("missing required column '{0}' in the texts file")]
    MissingColumn(String),

    /// Embedding or model failure outside any particular row (e.g. while building centroids).
    #[error("embedding failure: {0}")]
    Semantic(#[from] SemanticError),

    /// Embedding failure for one input row. Aborts the whole batch.
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: SemanticError,
    },

    /// Unreadable keyword or texts file.
    #[error("tabular file error: {0}")]
    Tabular(#[from] TabularError),

    /// Classification was requested before any keyword set was supplied.
    #[error("no department profile loaded; supply a keywords file")]
    NoProfile,

    /// The keyword source names no departments.
    #[error("the keyword set contains no departments")]
    EmptyKeywordSet,

    /// Pipeline settings are out of range.
    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
}

impl ClassifyError {
    /// Whether the caller's input, rather than the system, is at fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ClassifyError::MissingColumn(_) | ClassifyError::NoProfile | ClassifyError::EmptyKeywordSet
        )
    }
}
