//! The one loaded ONNX session, owned by a dedicated inference thread.
//!
//! `onnxruntime` sessions are not `Send`, so the session is created on the
//! worker thread and never leaves it. Callers hand text over a channel and
//! block on a per-request reply channel. The model is loaded (and checked
//! with one forward pass) before [`EncoderWorker::spawn`] returns, so a
//! broken model fails at startup rather than on the first request.

use std::cell::RefCell;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use once_cell::sync::OnceCell;
use onnxruntime::{environment::Environment, session::Session};
use tokenizers::{Tokenizer, TruncationParams};

use crate::assets::ModelAssets;
use crate::onnx::run_token_embeddings;
use crate::{SemanticError, TokenEmbeddings};

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

const WARMUP_TEXT: &str = "xin chào";

/// Tokenizer configured for truncation without padding, plus its session.
pub(crate) struct LoadedEncoder {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) session: RefCell<Session<'static>>,
}

impl LoadedEncoder {
    fn load(assets: &ModelAssets, max_sequence_length: usize) -> Result<Self, SemanticError> {
        let tokenizer = load_tokenizer(&assets.tokenizer_path, max_sequence_length)?;
        let session = open_session(&assets.model_path)?;
        Ok(Self {
            tokenizer,
            session: RefCell::new(session),
        })
    }
}

struct Job {
    text: String,
    reply: mpsc::SyncSender<Result<TokenEmbeddings, SemanticError>>,
}

/// Handle to the inference thread. Dropping the last clone stops the thread.
#[derive(Debug, Clone)]
pub(crate) struct EncoderWorker {
    jobs: mpsc::Sender<Job>,
}

impl EncoderWorker {
    /// Start the inference thread and wait until the model is loaded and warmed up.
    pub(crate) fn spawn(
        assets: ModelAssets,
        max_sequence_length: usize,
        hidden_size: usize,
    ) -> Result<Self, SemanticError> {
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();

        thread::Builder::new()
            .name("onnx-encoder".into())
            .spawn(move || {
                let loaded = match warm_load(&assets, max_sequence_length, hidden_size) {
                    Ok(loaded) => loaded,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                tracing::info!(
                    model = %assets.model_path.display(),
                    max_sequence_length,
                    "loaded ONNX encoder"
                );
                let _ = ready_tx.send(Ok(()));

                while let Ok(job) = jobs_rx.recv() {
                    let result = run_token_embeddings(&loaded, &job.text, hidden_size);
                    // The caller may have given up; nothing to do then.
                    let _ = job.reply.send(result);
                }
                tracing::debug!("ONNX encoder thread stopped");
            })?;

        ready_rx
            .recv()
            .map_err(|_| SemanticError::Inference("encoder thread exited while loading".into()))??;

        Ok(Self { jobs: jobs_tx })
    }

    /// Run one forward pass on the inference thread and wait for the result.
    pub(crate) fn encode(&self, text: &str) -> Result<TokenEmbeddings, SemanticError> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.jobs
            .send(Job {
                text: text.to_string(),
                reply: reply_tx,
            })
            .map_err(|_| SemanticError::Inference("encoder thread is not running".into()))?;
        reply_rx
            .recv()
            .map_err(|_| SemanticError::Inference("encoder thread dropped the request".into()))?
    }
}

fn warm_load(
    assets: &ModelAssets,
    max_sequence_length: usize,
    hidden_size: usize,
) -> Result<LoadedEncoder, SemanticError> {
    let loaded = LoadedEncoder::load(assets, max_sequence_length)?;
    run_token_embeddings(&loaded, WARMUP_TEXT, hidden_size)?;
    Ok(loaded)
}

fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer, SemanticError> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| SemanticError::TokenizerMissing(format!("{}: {e}", path.display())))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| SemanticError::InvalidConfig(e.to_string()))?;
    tokenizer.with_padding(None);
    Ok(tokenizer)
}

fn open_session(model: &Path) -> Result<Session<'static>, SemanticError> {
    let env = ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("deptclass-semantic")
            .build()
            .map_err(|e| SemanticError::Inference(e.to_string()))
    })?;
    env.new_session_builder()
        .map_err(|e| SemanticError::Inference(e.to_string()))?
        .with_model_from_file(model.to_path_buf())
        .map_err(|e| SemanticError::Inference(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_assets_fail_at_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.onnx");
        let tokenizer_path = dir.path().join("tokenizer.json");
        std::fs::write(&model_path, b"not a model").unwrap();
        std::fs::write(&tokenizer_path, b"not a tokenizer").unwrap();

        let err = EncoderWorker::spawn(
            ModelAssets {
                model_path,
                tokenizer_path,
            },
            256,
            768,
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::TokenizerMissing(_)));
    }
}
