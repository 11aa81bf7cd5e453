//! Result records and error definitions for the batch pipeline.

use crate::drive::{DriveError, FileDescriptor};
use crate::extraction::ExtractionError;
use crate::summarization::SummarizationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rendered in place of a size the backend did not report.
pub const UNKNOWN_SIZE: &str = "N/A";

/// Outcome of processing one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// A summary was generated.
    Success,
    /// Some stage failed; the summary field carries the message.
    Error,
    /// No status was recorded, as in an imported row without one. Never produced by a batch.
    #[default]
    Unknown,
}

impl FileStatus {
    /// Lowercase label used in CSV and PDF output. Unknown renders as an empty cell.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Unknown => "",
        }
    }

    fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// One row per processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// File display name.
    #[serde(default)]
    pub name: String,
    /// Media type reported by the backend.
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Size as reported by the backend, or `N/A`.
    #[serde(default)]
    pub size: String,
    /// Generated summary, or a human-readable error message when `status` is `error`.
    #[serde(default)]
    pub summary: String,
    /// Processing outcome.
    #[serde(default, skip_serializing_if = "FileStatus::is_unknown")]
    pub status: FileStatus,
    /// Browser link derived from the file id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SummaryResult {
    /// Successful row for `file`.
    pub fn success(file: &FileDescriptor, summary: String, url: Option<String>) -> Self {
        Self::from_descriptor(file, summary, FileStatus::Success, url)
    }

    /// Error row for `file` describing `error`.
    pub fn failure(file: &FileDescriptor, error: &FileError, url: Option<String>) -> Self {
        Self::from_descriptor(
            file,
            format!("Error processing file: {error}"),
            FileStatus::Error,
            url,
        )
    }

    fn from_descriptor(
        file: &FileDescriptor,
        summary: String,
        status: FileStatus,
        url: Option<String>,
    ) -> Self {
        Self {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file
                .size
                .clone()
                .unwrap_or_else(|| UNKNOWN_SIZE.to_string()),
            summary,
            status,
            url,
        }
    }
}

/// Ordered results of one batch.
///
/// `total_files` always equals `files.len()`; deserialization recomputes it from `files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawResultSet")]
pub struct ResultSet {
    /// Per-file results in listing order.
    pub files: Vec<SummaryResult>,
    /// Number of entries in `files`, error rows included.
    pub total_files: usize,
}

impl ResultSet {
    /// Assemble a result set, deriving the total from the rows.
    pub fn from_results(files: Vec<SummaryResult>) -> Self {
        let total_files = files.len();
        Self { files, total_files }
    }

    /// Result set for a batch that matched no files.
    pub fn empty() -> Self {
        Self::from_results(Vec::new())
    }

    /// Number of rows with `status = success`.
    pub fn success_count(&self) -> usize {
        self.count(FileStatus::Success)
    }

    /// Number of rows with `status = error`.
    pub fn error_count(&self) -> usize {
        self.count(FileStatus::Error)
    }

    /// Whether any row carries a url.
    pub fn has_urls(&self) -> bool {
        self.files.iter().any(|file| file.url.is_some())
    }

    fn count(&self, status: FileStatus) -> usize {
        self.files
            .iter()
            .filter(|file| file.status == status)
            .count()
    }
}

#[derive(Deserialize)]
struct RawResultSet {
    #[serde(default)]
    files: Vec<SummaryResult>,
}

impl From<RawResultSet> for ResultSet {
    fn from(raw: RawResultSet) -> Self {
        Self::from_results(raw.files)
    }
}

/// Failure of one stage while processing a single file.
#[derive(Debug, Error)]
pub enum FileError {
    /// Download failed.
    #[error("Error downloading file: {0}")]
    Download(#[from] DriveError),
    /// Bytes could not be staged on local disk.
    #[error("Error staging download: {0}")]
    Staging(#[from] std::io::Error),
    /// Text extraction failed or the format is unsupported.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
    /// Extracted text did not pass the validity gate.
    #[error("No usable text extracted (minimum {min_length} characters)")]
    InsufficientText {
        /// Minimum trimmed length required.
        min_length: usize,
    },
    /// The model call failed.
    #[error("{0}")]
    Summarization(#[from] SummarizationError),
    /// The blocking extraction worker did not complete.
    #[error("Extraction worker failed: {0}")]
    Worker(String),
}

/// Errors that abort a whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Folder listing failed; no partial listing is meaningful.
    #[error("Error listing files: {0}")]
    Listing(#[source] DriveError),
    /// Folder metadata lookup failed.
    #[error("Error getting folder metadata: {0}")]
    Metadata(#[source] DriveError),
}
