use super::prompt::{SYSTEM_PROMPT, build_prompt, estimate_tokens, truncate_input};
use super::{
    SummarizationClient, SummarizationClientError, SummarizationRequest, configured_model,
    get_summarization_client,
};
use crate::config::{Config, get_config};
use thiserror::Error;

/// Failure to summarize one document.
#[derive(Debug, Error)]
#[error("Error generating summary: {source}")]
pub struct SummarizationError {
    /// Provider error that caused the failure.
    #[from]
    pub source: SummarizationClientError,
}

/// Tunables applied to every summary request.
#[derive(Debug, Clone)]
pub struct SummarizerSettings {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Characters of document text sent to the model.
    pub input_budget: usize,
    /// Default output token budget.
    pub max_output_tokens: usize,
}

impl SummarizerSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: configured_model(config).to_string(),
            input_budget: config.summary_input_budget,
            max_output_tokens: config.summary_max_tokens,
        }
    }
}

/// Turns extracted text into a prose summary with exactly one provider call per document.
pub struct Summarizer {
    client: Box<dyn SummarizationClient>,
    settings: SummarizerSettings,
}

impl Summarizer {
    /// Wrap an explicit provider client.
    pub fn new(client: Box<dyn SummarizationClient>, settings: SummarizerSettings) -> Self {
        Self { client, settings }
    }

    /// Build a summarizer for the provider selected by the global configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        Self::new(
            get_summarization_client(),
            SummarizerSettings::from_config(config),
        )
    }

    /// Settings applied to each request.
    pub fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    /// Label of the provider behind this summarizer.
    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Summarize `text` using the configured output budget.
    pub async fn summarize(&self, text: &str, filename: &str) -> Result<String, SummarizationError> {
        self.summarize_with_limit(text, filename, self.settings.max_output_tokens)
            .await
    }

    /// Summarize `text`, letting the model generate at most `max_output_tokens` tokens.
    ///
    /// The text is truncated to the input budget before the prompt is built. Provider failures
    /// are returned as errors and never folded into the summary text.
    pub async fn summarize_with_limit(
        &self,
        text: &str,
        filename: &str,
        max_output_tokens: usize,
    ) -> Result<String, SummarizationError> {
        let input = truncate_input(text, self.settings.input_budget);
        let prompt = build_prompt(&input, filename);
        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.settings.model,
            filename,
            estimated_tokens = estimate_tokens(&prompt),
            truncated = input.as_str() != text,
            "Requesting summary"
        );

        let summary = self
            .client
            .generate_summary(SummarizationRequest {
                model: self.settings.model.clone(),
                system: SYSTEM_PROMPT.to_string(),
                prompt,
                max_tokens: max_output_tokens,
            })
            .await?;
        Ok(summary)
    }

    /// Summarize several documents one after another, keeping each outcome independent.
    pub async fn summarize_all(
        &self,
        documents: &[(String, String)],
    ) -> Vec<Result<String, SummarizationError>> {
        let mut summaries = Vec::with_capacity(documents.len());
        for (text, filename) in documents {
            summaries.push(self.summarize(text, filename).await);
        }
        summaries
    }
}
