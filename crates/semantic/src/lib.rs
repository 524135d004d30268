//! Text embedder for department classification.
//!
//! Turns a string into a matrix of per-token vectors: words are segmented
//! first (Unicode word boundaries or a naive lowercase/whitespace split), the
//! segmented text goes through a pretrained transformer encoder, and the last
//! hidden layer comes back one row per token, special tokens included. Callers
//! pool the rows themselves.
//!
//! Two encoders are available:
//!
//! - **ONNX** - runs a local model (PhoBERT by default). Needs `model.onnx`
//!   and `tokenizer.json`, downloaded on demand when URLs are configured.
//! - **Stub** - deterministic hash-derived token vectors. No assets, used by
//!   tests and as a fallback when model files are missing.
//!
//! ## Threading notes
//!
//! The ONNX model is loaded once, while the embedder is built, onto a
//! dedicated inference thread; every caller's forward pass is queued to it.
//! [`Embedder`] itself is `Send + Sync` and meant to live for the whole process.
//!
//! ```no_run
//! use semantic::{Embedder, EmbedderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), semantic::SemanticError> {
//!     let embedder = Embedder::from_config(&EmbedderConfig::default()).await?;
//!     let pooled = embedder.embed_pooled("Thông tin về học phí")?;
//!     println!("{} dims", pooled.dim());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod segment;
pub mod similarity;
pub mod types;

mod assets;
mod encoder;
mod onnx;
mod stub;
mod worker;

pub use crate::config::{EmbedderConfig, EncoderMode, SegmenterKind};
pub use crate::encoder::TextEncoder;
pub use crate::error::SemanticError;
pub use crate::onnx::OnnxEncoder;
pub use crate::segment::{segmenter_for, UnicodeWordSegmenter, WhitespaceSegmenter, WordSegmenter};
pub use crate::similarity::cosine_similarity;
pub use crate::stub::StubEncoder;
pub use crate::types::{EmbeddingVector, TokenEmbeddings};

use crate::assets::{is_missing_asset, resolve_model_assets};

/// Segmenter + encoder pair producing per-token embeddings of a fixed width.
pub struct Embedder {
    segmenter: Box<dyn WordSegmenter>,
    encoder: Box<dyn TextEncoder>,
    hidden_size: usize,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("segmenter", &self.segmenter.name())
            .field("encoder", &self.encoder.name())
            .field("hidden_size", &self.hidden_size)
            .finish()
    }
}

impl Embedder {
    /// Build an embedder from configuration, resolving (and possibly downloading) model assets.
    ///
    /// In ONNX mode the model is loaded and warmed up here. Missing local
    /// assets fall back to the stub encoder only when `fallback_to_stub` is
    /// explicitly set; download and load failures are always returned.
    pub async fn from_config(cfg: &EmbedderConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        let segmenter = segmenter_for(cfg.segmenter);

        let encoder: Box<dyn TextEncoder> = match cfg.mode {
            EncoderMode::Stub => Box::new(StubEncoder::new(
                cfg.hidden_size,
                cfg.max_sequence_length,
            )),
            EncoderMode::Onnx => match resolve_model_assets(cfg).await {
                Ok(assets) => Box::new(OnnxEncoder::load(
                    assets,
                    cfg.max_sequence_length,
                    cfg.hidden_size,
                    cfg.model_name.clone(),
                )?),
                Err(err) if cfg.fallback_to_stub && is_missing_asset(&err) => {
                    tracing::warn!(
                        model = %cfg.model_name,
                        error = %err,
                        "model assets unavailable, falling back to stub encoder"
                    );
                    Box::new(StubEncoder::new(cfg.hidden_size, cfg.max_sequence_length))
                }
                Err(err) => return Err(err),
            },
        };

        tracing::info!(
            segmenter = segmenter.name(),
            encoder = encoder.name(),
            hidden_size = cfg.hidden_size,
            "embedder ready"
        );

        Ok(Self {
            segmenter,
            encoder,
            hidden_size: cfg.hidden_size,
        })
    }

    /// Assemble an embedder from explicit parts.
    pub fn with_parts(
        segmenter: Box<dyn WordSegmenter>,
        encoder: Box<dyn TextEncoder>,
        hidden_size: usize,
    ) -> Self {
        Self {
            segmenter,
            encoder,
            hidden_size,
        }
    }

    /// Width of every token row this embedder produces.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn encoder_name(&self) -> &str {
        self.encoder.name()
    }

    pub fn segmenter_name(&self) -> &'static str {
        self.segmenter.name()
    }

    /// Segment `text`, run the encoder, and return one row per token.
    pub fn embed(&self, text: &str) -> Result<TokenEmbeddings, SemanticError> {
        let segmented = self.segmenter.segment(text).join(" ");
        let tokens = self.encoder.encode(&segmented)?;
        if tokens.dim() != self.hidden_size {
            return Err(SemanticError::DimensionMismatch {
                expected: self.hidden_size,
                actual: tokens.dim(),
            });
        }
        tracing::debug!(rows = tokens.rows(), "embedded text");
        Ok(tokens)
    }

    /// [`embed`](Self::embed) followed by mean pooling over the token rows.
    pub fn embed_pooled(&self, text: &str) -> Result<EmbeddingVector, SemanticError> {
        Ok(self.embed(text)?.mean_pool())
    }
}
