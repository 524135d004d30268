//! Long-lived classifier: one embedder, one cached department profile.

use std::sync::{Arc, RwLock};

use semantic::Embedder;
use serde::Serialize;

use crate::bucket::{bucket, ConfidenceBuckets, ConfidenceLabel};
use crate::classify::{classify, ClassificationResult};
use crate::config::PipelineConfig;
use crate::error::ClassifyError;
use crate::profile::{DepartmentProfile, KeywordSet};

/// Scores, buckets, and rendered label for one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledClassification {
    pub result: ClassificationResult,
    pub buckets: ConfidenceBuckets,
    pub label: String,
}

/// Shared entry point for classification.
///
/// The current profile sits behind a lock and is replaced wholesale: a new
/// profile is built without holding the lock and then swapped in, so readers
/// always see either the old or the new profile and never a mix.
pub struct ClassifierService {
    embedder: Embedder,
    config: PipelineConfig,
    profile: RwLock<Option<Arc<DepartmentProfile>>>,
}

impl std::fmt::Debug for ClassifierService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierService")
            .field("embedder", &self.embedder)
            .field("has_profile", &self.current_profile().is_some())
            .finish()
    }
}

impl ClassifierService {
    /// Build the embedder described by `config` and start without a profile.
    pub async fn from_config(config: PipelineConfig) -> Result<Self, ClassifyError> {
        config
            .validate()
            .map_err(|err| ClassifyError::InvalidConfig(err.to_string()))?;
        let embedder = Embedder::from_config(&config.semantic).await?;
        Ok(Self::with_embedder(embedder, config))
    }

    pub fn with_embedder(embedder: Embedder, config: PipelineConfig) -> Self {
        Self {
            embedder,
            config,
            profile: RwLock::new(None),
        }
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn current_profile(&self) -> Option<Arc<DepartmentProfile>> {
        self.profile
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Build a profile from `keywords` and make it current.
    pub fn rebuild(&self, keywords: &KeywordSet) -> Result<Arc<DepartmentProfile>, ClassifyError> {
        if keywords.is_empty() {
            return Err(ClassifyError::EmptyKeywordSet);
        }
        let profile = Arc::new(DepartmentProfile::build(&self.embedder, keywords)?);
        *self
            .profile
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&profile));
        tracing::info!(
            departments = profile.len(),
            fingerprint = profile.fingerprint(),
            "department profile swapped in"
        );
        Ok(profile)
    }

    /// The current profile when it was built from an identical keyword set,
    /// otherwise a freshly rebuilt one.
    pub fn profile_for(
        &self,
        keywords: &KeywordSet,
    ) -> Result<Arc<DepartmentProfile>, ClassifyError> {
        if let Some(current) = self.current_profile() {
            if current.fingerprint() == keywords.fingerprint() {
                tracing::debug!("reusing cached department profile");
                return Ok(current);
            }
        }
        self.rebuild(keywords)
    }

    /// Current profile or [`ClassifyError::NoProfile`].
    pub fn require_profile(&self) -> Result<Arc<DepartmentProfile>, ClassifyError> {
        self.current_profile().ok_or(ClassifyError::NoProfile)
    }

    /// Score `text` against `profile` using the configured threshold.
    pub fn classify(
        &self,
        profile: &DepartmentProfile,
        text: &str,
    ) -> Result<ClassificationResult, ClassifyError> {
        if profile.is_empty() {
            return Err(ClassifyError::EmptyKeywordSet);
        }
        classify(
            &self.embedder,
            profile,
            text,
            self.config.classify_threshold,
        )
    }

    /// [`classify`](Self::classify) plus bucketing and the rendered label.
    pub fn classify_text(
        &self,
        profile: &DepartmentProfile,
        text: &str,
    ) -> Result<LabeledClassification, ClassifyError> {
        let result = self.classify(profile, text)?;
        let buckets = bucket(&result, self.config.bucket_thresholds());
        let label = ConfidenceLabel::from_buckets(&buckets).render(self.config.label_locale);
        Ok(LabeledClassification {
            result,
            buckets,
            label,
        })
    }
}
