use crate::{SemanticError, TokenEmbeddings};

/// Turns already-segmented text into per-token vectors.
///
/// Implementations must be deterministic: the same input always yields the
/// same matrix for a fixed set of weights.
pub trait TextEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<TokenEmbeddings, SemanticError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
