//! Server module containing the DesignServer implementation

use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::ComponentCatalog;
use crate::clients::{GenerationError, OpenAiCompatClient, TextGenerator};
use crate::config::Config;
use crate::design::DesignPipeline;
use crate::error::Result;

pub mod router;

/// Main design-planner server implementation
#[derive(Clone)]
pub struct DesignServer {
    pub pipeline: Arc<DesignPipeline>,
    pub config: Arc<Config>, // Retain config to avoid future env reads
}

impl DesignServer {
    /// Build the server around an already-resolved catalog and generator.
    pub fn with_parts(
        config: Config,
        catalog: Arc<ComponentCatalog>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let pipeline = DesignPipeline::new(&config, catalog, generator);
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }

    /// Resolve the catalog and the generation client from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = Arc::new(ComponentCatalog::load(&config.catalog));
        info!("Component catalog: {} entries", catalog.len());

        let generator: Arc<dyn TextGenerator> =
            match OpenAiCompatClient::from_config(&config.generation, config.runtime.api_key.as_deref()) {
                Ok(client) => Arc::new(client),
                Err(GenerationError::MissingApiKey(env)) => {
                    warn!(
                        "{} is not set; complexity and strategy fall back to rules, design_block will fail",
                        env
                    );
                    Arc::new(UnconfiguredGenerator { env_var: env })
                }
                Err(e) => return Err(e.into()),
            };

        Ok(Self::with_parts(config, catalog, generator))
    }
}

/// Stand-in used when no API key is configured; every call fails.
struct UnconfiguredGenerator {
    env_var: String,
}

#[async_trait::async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(
        &self,
        _request: &crate::clients::GenerationRequest,
    ) -> std::result::Result<String, GenerationError> {
        Err(GenerationError::MissingApiKey(self.env_var.clone()))
    }
}
