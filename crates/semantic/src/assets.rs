//! Locating the ONNX model and tokenizer on disk, fetching them when a URL is configured.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{EmbedderConfig, SemanticError};

const DEFAULT_TOKENIZER_FILE: &str = "tokenizer.json";

/// Local paths of a resolved model/tokenizer pair.
#[derive(Debug, Clone)]
pub(crate) struct ModelAssets {
    pub(crate) model_path: PathBuf,
    pub(crate) tokenizer_path: PathBuf,
}

/// Assets absent locally with nothing to fetch them from. A failed download
/// does not count: a URL was configured, so the operator expects a real model.
pub(crate) fn is_missing_asset(err: &SemanticError) -> bool {
    matches!(
        err,
        SemanticError::ModelNotFound(_) | SemanticError::TokenizerMissing(_)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Model,
    Tokenizer,
}

impl AssetKind {
    fn missing(self, what: &Path) -> SemanticError {
        let what = what.display().to_string();
        match self {
            AssetKind::Model => SemanticError::ModelNotFound(what),
            AssetKind::Tokenizer => SemanticError::TokenizerMissing(what),
        }
    }
}

/// Where one asset should live locally and where it can be fetched from.
#[derive(Debug)]
struct AssetSource<'a> {
    kind: AssetKind,
    local: PathBuf,
    url: Option<&'a str>,
}

impl AssetSource<'_> {
    /// Local path of the asset, downloading it first when absent and a URL is known.
    async fn materialize(self) -> Result<PathBuf, SemanticError> {
        if self.local.is_file() {
            return Ok(self.local);
        }
        let Some(url) = self.url else {
            return Err(self.kind.missing(&self.local));
        };
        tracing::info!(
            kind = ?self.kind,
            url,
            target = %self.local.display(),
            "downloading model asset"
        );
        let bytes = fetch(url).await?;
        write_replacing(&self.local, &bytes)?;
        Ok(self.local)
    }
}

/// Ensures that the model and tokenizer exist locally, downloading them when URLs are provided.
pub(crate) async fn resolve_model_assets(
    cfg: &EmbedderConfig,
) -> Result<ModelAssets, SemanticError> {
    let model_path = AssetSource {
        kind: AssetKind::Model,
        local: cfg.model_path.clone(),
        url: cfg.model_url.as_deref(),
    }
    .materialize()
    .await?;

    let tokenizer_path = AssetSource {
        kind: AssetKind::Tokenizer,
        local: tokenizer_storage_path(cfg)?,
        url: cfg.tokenizer_url.as_deref(),
    }
    .materialize()
    .await?;

    Ok(ModelAssets {
        model_path,
        tokenizer_path,
    })
}

/// Explicit tokenizer path, else a file named after the tokenizer URL placed
/// beside the model.
fn tokenizer_storage_path(cfg: &EmbedderConfig) -> Result<PathBuf, SemanticError> {
    match (&cfg.tokenizer_path, &cfg.tokenizer_url) {
        (Some(path), _) => Ok(path.clone()),
        (None, Some(url)) => {
            let file_name =
                infer_filename_from_url(url).unwrap_or_else(|| DEFAULT_TOKENIZER_FILE.into());
            let dir = cfg.model_path.parent().unwrap_or_else(|| Path::new("."));
            Ok(dir.join(file_name))
        }
        (None, None) => Err(SemanticError::TokenizerMissing(cfg.model_name.clone())),
    }
}

async fn fetch(url: &str) -> Result<Vec<u8>, SemanticError> {
    let download = |e: reqwest::Error| SemanticError::Download(format!("{url}: {e}"));
    let response = reqwest::get(url).await.map_err(download)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SemanticError::Download(format!("{url}: HTTP {status}")));
    }
    Ok(response.bytes().await.map_err(download)?.to_vec())
}

/// Write to a temp file beside `target` and persist it over `target`, so a
/// half-written model is never picked up.
fn write_replacing(target: &Path, bytes: &[u8]) -> Result<(), SemanticError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|err| err.error)?;
    Ok(())
}

/// Last non-empty path segment of `url`, minus any query or fragment.
fn infer_filename_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}
