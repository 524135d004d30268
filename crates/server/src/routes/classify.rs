use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use deptclass::{classify_grid, require_text_column, results_grid, ClassifiedRow, KeywordSet};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tabular::{read_grid, write_csv_atomic, Grid, TabularFormat};

/// File name of the classification output inside `results_dir`.
pub const RESULTS_FILE_NAME: &str = "classified_results.csv";

/// Response from classifying an uploaded texts file
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub message: String,
    pub output_file: String,
    pub data: Vec<ClassifiedRow>,
}

struct Upload {
    file_name: Option<String>,
    bytes: Bytes,
}

impl Upload {
    fn into_grid(self) -> ServerResult<Grid> {
        let format = TabularFormat::detect(self.file_name.as_deref(), &self.bytes);
        Ok(read_grid(&self.bytes, format)?)
    }
}

/// Classify every row of an uploaded texts file.
///
/// Multipart fields:
/// - `texts_file` (required): table with a `text` column and optional `sentiment` column
/// - `keywords_file` (optional): one column per department, keywords below the header
///
/// Without `keywords_file` the default keyword set loaded at startup is used.
/// The labelled table is also written to `results_dir/classified_results.csv`.
///
/// # Example
/// ```json
/// {
///   "message": "Classified 1 rows",
///   "output_file": "./classified_results.csv",
///   "data": [
///     { "text": "Thông tin về học phí", "departments": "Rất cao: PHÒNG ĐÀO TẠO" }
///   ]
/// }
/// ```
pub async fn classify_texts(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> ServerResult<impl IntoResponse> {
    let mut texts = None;
    let mut keywords = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        match name.as_str() {
            "texts_file" => {
                texts = Some(Upload {
                    file_name,
                    bytes: field.bytes().await?,
                })
            }
            "keywords_file" => {
                keywords = Some(Upload {
                    file_name,
                    bytes: field.bytes().await?,
                })
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let texts = texts.ok_or_else(|| ServerError::BadRequest("missing 'texts_file'".to_string()))?;

    let worker = Arc::clone(&state);
    let (rows, output) =
        tokio::task::spawn_blocking(move || run_classification(&worker, texts, keywords))
            .await??;

    Ok(Json(ClassifyResponse {
        message: format!("Classified {} rows", rows.len()),
        output_file: output.display().to_string(),
        data: rows,
    }))
}

fn run_classification(
    state: &ServerState,
    texts: Upload,
    keywords: Option<Upload>,
) -> ServerResult<(Vec<ClassifiedRow>, PathBuf)> {
    let service = &state.classifier;

    // Reject a malformed texts file before paying for a profile build.
    let grid = texts.into_grid()?;
    require_text_column(&grid)?;

    let profile = match keywords {
        Some(upload) => {
            let keyword_grid = upload.into_grid()?;
            let drop_first = service.config().keyword_source.drop_first_data_row;
            service.profile_for(&KeywordSet::from_grid(&keyword_grid, drop_first))?
        }
        None => match &state.default_keywords {
            Some(set) => service.profile_for(set)?,
            None => service.require_profile()?,
        },
    };

    let rows = classify_grid(service, &profile, &grid)?;

    let output = state.config.results_dir.join(RESULTS_FILE_NAME);
    write_csv_atomic(&output, &results_grid(&rows))?;
    tracing::info!(rows = rows.len(), output = %output.display(), "classification results written");

    Ok((rows, output))
}
