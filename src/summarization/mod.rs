//! Language-model summarization behind a provider-neutral capability interface.
//!
//! Two providers ship today, OpenAI chat completions and a local Ollama runtime. Both issue
//! HTTP requests directly and are selected by [`get_summarization_client`] from
//! configuration. [`Summarizer`] layers the deterministic pre-processing (input truncation and
//! prompt assembly) on top of whichever client is active.

mod ollama;
mod openai;
pub mod prompt;
pub(crate) mod summarizer;

use crate::config::{Config, SummarizationProvider, get_config};
use async_trait::async_trait;
use thiserror::Error;

pub use ollama::OllamaSummarizationClient;
pub use openai::OpenAiSummarizationClient;
pub use prompt::{TRUNCATION_MARKER, build_prompt, estimate_tokens, truncate_input};
pub use summarizer::{SummarizationError, Summarizer, SummarizerSettings};

/// Errors surfaced by a summarization provider.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was misconfigured or unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Request payload passed to the summarization provider.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Standing instruction describing the assistant's role.
    pub system: String,
    /// Prompt assembled from the document text.
    pub prompt: String,
    /// Maximum number of tokens the provider may generate.
    pub max_tokens: usize,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate a summary for the prompt using the requested model.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;

    /// Short provider label used in logs.
    fn provider_name(&self) -> &'static str;
}

/// Build the summarization client selected by the global configuration.
pub fn get_summarization_client() -> Box<dyn SummarizationClient> {
    summarization_client_for(get_config())
}

/// Build the summarization client selected by `config`.
pub fn summarization_client_for(config: &Config) -> Box<dyn SummarizationClient> {
    match config.summarization_provider {
        SummarizationProvider::OpenAI => Box::new(OpenAiSummarizationClient::new(
            config.openai_url.clone(),
            config.openai_api_key.clone(),
        )),
        SummarizationProvider::Ollama => {
            Box::new(OllamaSummarizationClient::new(config.ollama_url.clone()))
        }
    }
}

/// Model identifier configured for the active provider.
pub fn configured_model(config: &Config) -> &str {
    match config.summarization_provider {
        SummarizationProvider::OpenAI => &config.openai_model,
        SummarizationProvider::Ollama => &config.ollama_model,
    }
}
