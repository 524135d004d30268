//! Whole-file classification: a table of texts in, a table of labels out.

use serde::{Deserialize, Serialize};
use tabular::Grid;

use crate::error::ClassifyError;
use crate::profile::DepartmentProfile;
use crate::service::ClassifierService;

pub const TEXT_COLUMN: &str = "text";
pub const SENTIMENT_COLUMN: &str = "sentiment";
pub const DEPARTMENTS_COLUMN: &str = "departments";

/// One classified input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRow {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    pub departments: String,
}

/// Index of the `text` column, or `MissingColumn` when `grid` has none.
pub fn require_text_column(grid: &Grid) -> Result<usize, ClassifyError> {
    grid.column_index(TEXT_COLUMN)
        .ok_or_else(|| ClassifyError::MissingColumn(TEXT_COLUMN.to_string()))
}

/// Label every row of `grid` against `profile`.
///
/// `grid` must have a `text` column. A `sentiment` column is carried through
/// when present. Rows come back in input order. Any row failure fails the
/// whole batch.
pub fn classify_grid(
    service: &ClassifierService,
    profile: &DepartmentProfile,
    grid: &Grid,
) -> Result<Vec<ClassifiedRow>, ClassifyError> {
    let text_idx = require_text_column(grid)?;
    let sentiment_idx = grid.column_index(SENTIMENT_COLUMN);

    if profile.is_empty() {
        return Err(ClassifyError::EmptyKeywordSet);
    }

    let mut out = Vec::with_capacity(grid.rows().len());
    for (row_no, row) in grid.rows().iter().enumerate() {
        let text = row.get(text_idx).cloned().unwrap_or_default();
        let labeled = service
            .classify_text(profile, &text)
            .map_err(|err| match err {
                ClassifyError::Semantic(source) => ClassifyError::Row {
                    row: row_no + 1,
                    source,
                },
                other => other,
            })?;
        out.push(ClassifiedRow {
            text,
            sentiment: sentiment_idx.and_then(|idx| row.get(idx).cloned()),
            departments: labeled.label,
        });
    }

    tracing::info!(rows = out.len(), "classified batch");
    Ok(out)
}

/// Lay classified rows out as `text[, sentiment], departments`.
/// The sentiment column is written only when some row carries one.
pub fn results_grid(rows: &[ClassifiedRow]) -> Grid {
    let with_sentiment = rows.iter().any(|r| r.sentiment.is_some());

    let mut headers = vec![TEXT_COLUMN.to_string()];
    if with_sentiment {
        headers.push(SENTIMENT_COLUMN.to_string());
    }
    headers.push(DEPARTMENTS_COLUMN.to_string());

    let body = rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.text.clone()];
            if with_sentiment {
                cells.push(r.sentiment.clone().unwrap_or_default());
            }
            cells.push(r.departments.clone());
            cells
        })
        .collect();

    Grid::new(headers, body)
}
