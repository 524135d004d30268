use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::session::Session;
use std::cell::RefCell;

use crate::assets::ModelAssets;
use crate::encoder::TextEncoder;
use crate::worker::{EncoderWorker, LoadedEncoder};
use crate::{SemanticError, TokenEmbeddings};

/// Transformer encoder executed through ONNX Runtime.
///
/// The model is loaded once, on a dedicated inference thread, when the
/// encoder is built. Clones share that thread.
#[derive(Debug, Clone)]
pub struct OnnxEncoder {
    worker: EncoderWorker,
    label: String,
}

impl OnnxEncoder {
    /// Load the model and tokenizer, failing if either cannot be opened or
    /// the model's output width differs from `hidden_size`.
    pub(crate) fn load(
        assets: ModelAssets,
        max_sequence_length: usize,
        hidden_size: usize,
        label: String,
    ) -> Result<Self, SemanticError> {
        Ok(Self {
            worker: EncoderWorker::spawn(assets, max_sequence_length, hidden_size)?,
            label,
        })
    }
}

impl TextEncoder for OnnxEncoder {
    fn encode(&self, text: &str) -> Result<TokenEmbeddings, SemanticError> {
        self.worker.encode(text)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Tokenize `text`, run one forward pass and return the last hidden state rows.
pub(crate) fn run_token_embeddings(
    loaded: &LoadedEncoder,
    text: &str,
    hidden_size: usize,
) -> Result<TokenEmbeddings, SemanticError> {
    let encoding = loaded
        .tokenizer
        .encode(text, true)
        .map_err(|e| SemanticError::Tokenization(e.to_string()))?;
    let ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
    let mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&x| x as i64)
        .collect();

    let (input_ids, attn_mask) = build_input_arrays(ids, mask)?;
    let (shape, flat) = execute_session(&loaded.session, input_ids, attn_mask)?;
    rows_from_hidden_state(&shape, flat, hidden_size)
}

fn build_input_arrays(
    ids: Vec<i64>,
    mask: Vec<i64>,
) -> Result<(Array2<i64>, Array2<i64>), SemanticError> {
    if ids.len() != mask.len() {
        return Err(SemanticError::Tokenization(
            "tokenizer produced mismatched id/mask lengths".into(),
        ));
    }
    if ids.is_empty() {
        return Err(SemanticError::Tokenization(
            "tokenizer produced no tokens".into(),
        ));
    }
    let seq_len = ids.len();
    let input_ids = Array::from_shape_vec((1, seq_len), ids)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((1, seq_len), mask)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}

fn execute_session(
    session: &RefCell<Session<'static>>,
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
) -> Result<(Vec<usize>, Vec<f32>), SemanticError> {
    let mut session = session.borrow_mut();
    let declared: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
    if declared.is_empty() {
        return Err(SemanticError::Inference(
            "model did not declare any inputs".into(),
        ));
    }

    // Feed tensors in the order the graph declares them.
    let token_types = Array::zeros(input_ids.raw_dim());
    let mut feeds = Vec::with_capacity(declared.len());
    for name in &declared {
        let tensor = match name.as_str() {
            "input_ids" => input_ids.clone(),
            "attention_mask" => attn_mask.clone(),
            "token_type_ids" => token_types.clone(),
            other => {
                return Err(SemanticError::Inference(format!(
                    "unsupported model input '{other}'"
                )))
            }
        };
        feeds.push(tensor.into_dyn());
    }

    let outputs = session
        .run::<i64, f32, _>(feeds)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let hidden = outputs
        .into_iter()
        .next()
        .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;

    Ok((hidden.shape().to_vec(), hidden.iter().copied().collect()))
}

/// Reshape a `[1, seq, hidden]` output into token rows.
fn rows_from_hidden_state(
    shape: &[usize],
    flat: Vec<f32>,
    hidden_size: usize,
) -> Result<TokenEmbeddings, SemanticError> {
    let (rows, dim) = match shape {
        [1, seq, hidden] => (*seq, *hidden),
        [_, _, _] => {
            return Err(SemanticError::Inference(format!(
                "expected a single-sequence batch, got output shape {shape:?}"
            )))
        }
        _ => {
            return Err(SemanticError::Inference(format!(
                "expected last hidden state [batch, seq, hidden], got output shape {shape:?}"
            )))
        }
    };
    if dim != hidden_size {
        return Err(SemanticError::DimensionMismatch {
            expected: hidden_size,
            actual: dim,
        });
    }
    TokenEmbeddings::from_flat(flat, rows, dim)
}
