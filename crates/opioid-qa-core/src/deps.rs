use std::sync::Arc;

use ai_client::OpenAi;
use anyhow::Result;
use tracing::info;

use crate::completion::{CompletionService, OpenAiCompletion};
use crate::config::AppConfig;
use crate::corpus::{self, DocumentSource, PdfSource};
use crate::orchestrator::QueryOrchestrator;

/// Central dependency container passed to request handlers.
#[derive(Clone)]
pub struct ServerDeps {
    pub orchestrator: Arc<QueryOrchestrator>,
    pub config: AppConfig,
}

impl ServerDeps {
    pub fn new(orchestrator: Arc<QueryOrchestrator>, config: AppConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Load the corpus once and wire the pipeline against `completion`.
    pub fn build(
        config: AppConfig,
        source: &dyn DocumentSource,
        completion: Arc<dyn CompletionService>,
    ) -> Result<Self> {
        let corpus = corpus::load(source, config.on_load_failure)?;
        let orchestrator = QueryOrchestrator::with_completion(completion, corpus);
        Ok(Self::new(Arc::new(orchestrator), config))
    }

    /// Production wiring: PDF at `document_path`, OpenAI for both model calls.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let mut ai = OpenAi::new(&config.openai_api_key, &config.openai_model)
            .with_http_client(http_client);
        if let Some(ref url) = config.openai_base_url {
            ai = ai.with_base_url(url);
        }

        info!(model = %config.openai_model, document = %config.document_path.display(), "Building pipeline");

        let completion: Arc<dyn CompletionService> = Arc::new(OpenAiCompletion::new(ai));
        let source = PdfSource::new(&config.document_path);
        Self::build(config, &source, completion)
    }
}
