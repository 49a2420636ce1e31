//! Server application state shared across handlers

use crate::config::AppConfig;
use crate::llm::OpenAiClient;
use crate::pipeline::AnalysisPipeline;
use anyhow::Context;
use std::sync::Arc;

/// Read-only state handed to every handler.
///
/// Built once at startup from an explicit `AppConfig`; handlers never see
/// a global. Cloning is cheap (two `Arc`s).
#[derive(Clone)]
pub struct ServerAppState {
    /// Startup configuration
    pub config: Arc<AppConfig>,

    /// Analysis pipeline; absent when no credential was configured
    pub pipeline: Option<Arc<AnalysisPipeline>>,
}

impl ServerAppState {
    /// Create state with an explicit pipeline (or none)
    pub fn new(config: AppConfig, pipeline: Option<AnalysisPipeline>) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: pipeline.map(Arc::new),
        }
    }

    /// Build the production state: an OpenAI-backed pipeline when a credential is present
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let pipeline = match &config.api_key {
            Some(api_key) => {
                let client = OpenAiClient::new(api_key.clone(), config.llm.clone())
                    .context("Failed to create OpenAI client")?;
                Some(AnalysisPipeline::new(Arc::new(client)).context("Failed to load prompts")?)
            }
            None => None,
        };

        Ok(Self::new(config, pipeline))
    }

    pub fn openai_configured(&self) -> bool {
        self.config.openai_configured()
    }
}
