//! Process-wide serving state, built once at startup.

use crate::generator::AnswerGenerator;
use crate::guard::DomainGuard;
use crate::records::Records;
use guide_core::config::ClassifierMode;
use guide_core::{AppConfig, AppError, AppResult};
use guide_knowledge::{create_provider, JsonlIndex, Retriever};
use guide_llm::{create_client, LlmClient};
use guide_prompt::PromptLibrary;
use std::sync::Arc;

/// Everything a request needs. Immutable once built and shared behind `Arc`.
#[derive(Debug)]
pub struct GuideContext {
    pub region: String,
    pub guard: DomainGuard,
    pub classifier: ClassifierMode,
    pub records: Records,
    pub prompts: PromptLibrary,
    pub max_input_chars: usize,
    pub retriever: Retriever,
    pub generator: AnswerGenerator,
}

impl GuideContext {
    /// Load the index, records, prompts and provider clients.
    ///
    /// Every failure here is a configuration error and must stop startup.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let index_path = config.index_path();
        if !index_path.exists() {
            return Err(AppError::Config(format!(
                "Knowledge index not found at {:?}",
                index_path
            )));
        }
        let index = JsonlIndex::load(&index_path)
            .map_err(|e| AppError::Config(format!("Knowledge index is unusable: {}", e)))?;

        let embedder = create_provider(&config.knowledge.embedding, config.api_key.as_deref())?;
        let retriever = Retriever::new(
            Arc::new(index),
            embedder,
            config.knowledge.top_k,
            config.knowledge.min_score,
        )?;

        let client = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            config.api_key.as_deref(),
        )?;

        let records = Records::load(config)?;
        let prompts = PromptLibrary::load(Some(&config.prompts_dir()))?;

        let context = Self::assemble(config, retriever, client, records, prompts)?;
        tracing::info!(
            region = %context.region,
            chunks = context.retriever.chunk_count(),
            provider = context.generator.provider_name(),
            "Guide context ready"
        );
        Ok(context)
    }

    /// Build a context from parts already in memory, with built-in prompts.
    pub fn from_parts(
        config: &AppConfig,
        retriever: Retriever,
        client: Arc<dyn LlmClient>,
        records: Records,
    ) -> AppResult<Self> {
        Self::assemble(config, retriever, client, records, PromptLibrary::builtin()?)
    }

    fn assemble(
        config: &AppConfig,
        retriever: Retriever,
        client: Arc<dyn LlmClient>,
        records: Records,
        prompts: PromptLibrary,
    ) -> AppResult<Self> {
        Ok(Self {
            region: config.region.clone(),
            guard: DomainGuard::from_settings(&config.guard)?,
            classifier: config.classifier.mode,
            records,
            prompts,
            max_input_chars: config.prompt.max_input_chars,
            retriever,
            generator: AnswerGenerator::new(client, &config.llm),
        })
    }

    pub fn chunk_count(&self) -> usize {
        self.retriever.chunk_count()
    }
}
