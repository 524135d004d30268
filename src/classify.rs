//! Scoring a text against department centroids.

use std::cmp::Ordering;

use semantic::{cosine_similarity, Embedder, EmbeddingVector};
use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::profile::DepartmentProfile;

/// Default minimum similarity for a department to be reported.
pub const DEFAULT_THRESHOLD: f32 = 0.3;

/// A department and its cosine similarity to the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentScore {
    pub department: String,
    pub score: f32,
}

/// Departments at or above the threshold, best first.
/// Equal scores are ordered by department name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationResult {
    scores: Vec<DepartmentScore>,
}

impl ClassificationResult {
    /// Sort `scores` into result order. Input order does not matter.
    pub fn from_scores(mut scores: Vec<DepartmentScore>) -> Self {
        scores.sort_by(rank);
        Self { scores }
    }

    pub fn scores(&self) -> &[DepartmentScore] {
        &self.scores
    }

    pub fn top(&self) -> Option<&DepartmentScore> {
        self.scores.first()
    }

    pub fn score_of(&self, department: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|s| s.department == department)
            .map(|s| s.score)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl IntoIterator for ClassificationResult {
    type Item = DepartmentScore;
    type IntoIter = std::vec::IntoIter<DepartmentScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.scores.into_iter()
    }
}

fn rank(a: &DepartmentScore, b: &DepartmentScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.department.cmp(&b.department))
}

/// Score an already pooled text vector against every centroid in `profile`.
pub fn score_vector(
    vector: &EmbeddingVector,
    profile: &DepartmentProfile,
    threshold: f32,
) -> ClassificationResult {
    let scores = profile
        .iter()
        .map(|(department, centroid)| DepartmentScore {
            department: department.to_string(),
            score: cosine_similarity(vector.as_slice(), centroid.as_slice()),
        })
        .filter(|s| s.score >= threshold)
        .collect();
    ClassificationResult::from_scores(scores)
}

/// Embed `text`, mean-pool it, and score it against `profile`.
///
/// Empty or whitespace-only text yields an empty result without touching
/// the encoder.
pub fn classify(
    embedder: &Embedder,
    profile: &DepartmentProfile,
    text: &str,
    threshold: f32,
) -> Result<ClassificationResult, ClassifyError> {
    if text.trim().is_empty() {
        return Ok(ClassificationResult::default());
    }
    let pooled = embedder.embed_pooled(text)?;
    Ok(score_vector(&pooled, profile, threshold))
}
