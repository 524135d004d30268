use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use deptclass::{ClassifierService, KeywordSet, PipelineConfig};
use knowledge::KnowledgeBase;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Embedder plus the current department profile (shared across requests)
    pub classifier: Arc<ClassifierService>,

    /// Keyword knowledge base
    pub knowledge: Arc<KnowledgeBase>,

    /// Keyword set used when a classify request does not upload one
    pub default_keywords: Option<Arc<KeywordSet>>,
}

impl ServerState {
    /// Create new server state: load the pipeline config, build the embedder,
    /// open the knowledge base, and prime the profile from the default keywords.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = match &config.pipeline_config_path {
            Some(path) => PipelineConfig::from_file(path)
                .map_err(|err| ServerError::Config(format!("{}: {err}", path.display())))?,
            None => PipelineConfig::default(),
        };
        let drop_first_data_row = pipeline.keyword_source.drop_first_data_row;

        let classifier = Arc::new(ClassifierService::from_config(pipeline).await?);
        let knowledge = Arc::new(KnowledgeBase::load(&config.knowledge_base_path)?);

        let default_keywords = match &config.default_keywords_path {
            Some(path) => {
                let grid = tabular::read_grid_from_path(path)?;
                let keywords = Arc::new(KeywordSet::from_grid(&grid, drop_first_data_row));
                let service = Arc::clone(&classifier);
                let primed = Arc::clone(&keywords);
                tokio::task::spawn_blocking(move || service.rebuild(&primed)).await??;
                tracing::info!(
                    path = %path.display(),
                    departments = keywords.len(),
                    "default keyword set loaded"
                );
                Some(keywords)
            }
            None => None,
        };

        Ok(Self::from_parts(
            config,
            classifier,
            knowledge,
            default_keywords,
        ))
    }

    /// Assemble state from already built parts.
    pub fn from_parts(
        config: ServerConfig,
        classifier: Arc<ClassifierService>,
        knowledge: Arc<KnowledgeBase>,
        default_keywords: Option<Arc<KeywordSet>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            classifier,
            knowledge,
            default_keywords,
        }
    }
}
