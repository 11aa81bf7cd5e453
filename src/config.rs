use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3";
const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:4100";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the drivedigest service and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Drive v3 REST API.
    pub drive_api_url: String,
    /// OAuth bearer token presented to the Drive API.
    pub drive_access_token: String,
    /// Language-model backend used to generate summaries.
    pub summarization_provider: SummarizationProvider,
    /// API key for the OpenAI backend, checked when a summary is requested.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub openai_url: String,
    /// Model identifier sent to the OpenAI backend.
    pub openai_model: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Model identifier sent to the Ollama backend.
    pub ollama_model: String,
    /// Output token budget per summary.
    pub summary_max_tokens: usize,
    /// Number of characters of extracted text handed to the model.
    pub summary_input_budget: usize,
    /// Minimum trimmed length extracted text must reach before it is summarized.
    pub min_text_length: usize,
    /// Directory where downloaded files are staged while they are processed.
    pub download_dir: PathBuf,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Base URL of a running drivedigest server, used by the remote client.
    pub service_url: String,
    /// Whole-request timeout applied by the remote client.
    pub service_timeout_secs: u64,
}

/// Supported language-model backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Hosted OpenAI chat completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl SummarizationProvider {
    /// Stable lowercase label used in logs and health output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            drive_api_url: load_env_or("GOOGLE_DRIVE_API_URL", DEFAULT_DRIVE_API_URL),
            drive_access_token: load_env("GOOGLE_DRIVE_ACCESS_TOKEN")?,
            summarization_provider: load_env_optional("SUMMARIZATION_PROVIDER")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".to_string())
                    })
                })
                .transpose()?
                .unwrap_or(SummarizationProvider::OpenAI),
            openai_api_key: load_env_optional("OPENAI_API_KEY"),
            openai_url: load_env_or("OPENAI_URL", DEFAULT_OPENAI_URL),
            openai_model: load_env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            ollama_url: load_env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            ollama_model: load_env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            summary_max_tokens: parse_optional("SUMMARY_MAX_TOKENS")?.unwrap_or(500),
            summary_input_budget: parse_optional("SUMMARY_INPUT_BUDGET")?.unwrap_or(12_000),
            min_text_length: parse_optional("MIN_TEXT_LENGTH")?.unwrap_or(1),
            download_dir: PathBuf::from(load_env_or("DOWNLOAD_DIR", "temp_downloads")),
            server_port: parse_optional("SERVER_PORT")?,
            service_url: load_env_or("SUMMARIZER_SERVICE_URL", DEFAULT_SERVICE_URL),
            service_timeout_secs: parse_optional("SERVICE_TIMEOUT_SECS")?.unwrap_or(300),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_or(key: &str, default: &str) -> String {
    load_env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        drive_api_url = %config.drive_api_url,
        provider = config.summarization_provider.as_str(),
        download_dir = %config.download_dir.display(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("OpenAI".parse(), Ok(SummarizationProvider::OpenAI));
        assert_eq!(" ollama ".parse(), Ok(SummarizationProvider::Ollama));
        assert_eq!("anthropic".parse::<SummarizationProvider>(), Err(()));
    }

    #[test]
    fn provider_labels_are_lowercase() {
        assert_eq!(SummarizationProvider::OpenAI.as_str(), "openai");
        assert_eq!(SummarizationProvider::Ollama.as_str(), "ollama");
    }
}
