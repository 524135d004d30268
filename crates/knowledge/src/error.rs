use tabular::TabularError;
use thiserror::Error;

/// Errors raised by the knowledge base.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("keyword '{0}' not found")]
    NotFound(String),
    #[error("keyword must not be empty")]
    EmptyKeyword,
    #[error("failed to load knowledge base: {0}")]
    Load(#[source] TabularError),
    #[error("failed to persist knowledge base: {0}")]
    Persist(#[source] TabularError),
}
