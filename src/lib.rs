//! Keyword-centroid department classifier.
//!
//! Every department is described by a handful of keywords. The keywords of
//! a department are embedded together and mean-pooled into a centroid; an
//! incoming text is embedded the same way and scored against every centroid
//! by cosine similarity. Scores at or above the threshold (0.3 by default)
//! are reported best first, then split into "very high" (> 0.70) and
//! "high" (> 0.60) tiers for a one-line label.
//!
//! ```text
//! KeywordSet ──build──▶ DepartmentProfile ─┐
//!                                           ├─ classify ─▶ ClassificationResult ─ bucket ─▶ label
//! text ──embed──▶ pooled vector ───────────┘
//! ```
//!
//! [`ClassifierService`] holds the embedder and the current profile for the
//! lifetime of a process and only rebuilds centroids when the keyword set
//! changes. [`classify_grid`] applies it to a whole table of texts.
//!
//! ```no_run
//! use deptclass::{ClassifierService, KeywordSet, PipelineConfig};
//!
//! # async fn run() -> Result<(), deptclass::ClassifyError> {
//! let service = ClassifierService::from_config(PipelineConfig::default()).await?;
//! let keywords: KeywordSet = [
//!     ("phòng đào tạo", vec!["tuyển sinh", "học phí"]),
//!     ("phòng truyền thông", vec!["sự kiện", "báo chí"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let profile = service.profile_for(&keywords)?;
//! let labeled = service.classify_text(&profile, "Thông tin về học phí và tuyển sinh")?;
//! println!("{}", labeled.label);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod bucket;
pub mod classify;
pub mod config;
pub mod error;
pub mod profile;
pub mod service;

pub use crate::batch::{classify_grid, require_text_column, results_grid, ClassifiedRow};
pub use crate::bucket::{
    bucket, label_for, BucketThresholds, ConfidenceBuckets, ConfidenceLabel, ConfidenceTier,
    LabelLocale,
};
pub use crate::classify::{
    classify, score_vector, ClassificationResult, DepartmentScore, DEFAULT_THRESHOLD,
};
pub use crate::config::{ConfigLoadError, KeywordSourceConfig, PipelineConfig};
pub use crate::error::ClassifyError;
pub use crate::profile::{DepartmentProfile, KeywordSet};
pub use crate::service::{ClassifierService, LabeledClassification};

pub use semantic::{Embedder, EmbedderConfig, EncoderMode, SemanticError};
pub use tabular::{Grid, TabularError};
