//! HTTP client for a running drivedigest server.
//!
//! Used by the CLI's `remote` mode so a thin front end can hand batches to a long-lived
//! server. Transport failures are classified into user-facing messages.

use crate::config::get_config;
use crate::drive::FileKind;
use crate::processing::ResultSet;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the remote summarizer service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service could not be reached at all.
    #[error("Cannot connect to summarizer service. Make sure it is running.")]
    Connect,
    /// The whole-request timeout elapsed.
    #[error("Request timeout. The folder may be too large.")]
    Timeout,
    /// The service answered with a non-success status.
    #[error("Error from summarizer service ({status}): {detail}")]
    Service {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Error detail reported by the service, or the raw body.
        detail: String,
    },
    /// Anything else, including undecodable responses.
    #[error("An error occurred: {0}")]
    Other(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect
        } else {
            Self::Other(error.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Client for the summarize and export endpoints of a drivedigest server.
pub struct ServiceClient {
    http: Client,
    base_url: String,
}

impl ServiceClient {
    /// Build a client targeting `SUMMARIZER_SERVICE_URL` with `SERVICE_TIMEOUT_SECS`.
    pub fn new() -> Result<Self, RemoteError> {
        let config = get_config();
        Self::with_base_url(
            &config.service_url,
            Duration::from_secs(config.service_timeout_secs),
        )
    }

    /// Build a client for an explicit base URL and whole-request timeout.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .user_agent("drivedigest/remote")
            .timeout(timeout)
            .build()
            .map_err(|error| RemoteError::Other(error.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the service to summarize `folder_id`, restricted to `kinds`.
    pub async fn summarize_folder(
        &self,
        folder_id: &str,
        kinds: &[FileKind],
    ) -> Result<ResultSet, RemoteError> {
        tracing::info!(folder = folder_id, service = %self.base_url, "Submitting remote batch");
        let response = self
            .http
            .post(format!("{}/summarize", self.base_url))
            .json(&json!({ "folder_id": folder_id, "file_types": kinds }))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        response
            .json::<ResultSet>()
            .await
            .map_err(|error| RemoteError::Other(format!("invalid response body: {error}")))
    }

    /// Render `results` as CSV on the service.
    pub async fn export_csv(&self, results: &ResultSet) -> Result<Vec<u8>, RemoteError> {
        self.export("csv", results).await
    }

    /// Render `results` as a PDF report on the service.
    pub async fn export_pdf(&self, results: &ResultSet) -> Result<Vec<u8>, RemoteError> {
        self.export("pdf", results).await
    }

    async fn export(&self, format: &str, results: &ResultSet) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .http
            .post(format!("{}/export/{format}", self.base_url))
            .json(results)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|parsed| parsed.detail)
            .unwrap_or(body);
        Err(RemoteError::Service { status, detail })
    }
}
