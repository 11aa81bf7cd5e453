//! Shared types used by the Drive client and helpers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with the folder backend.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Drive URL: {0}")]
    InvalidUrl(String),
    /// Network, authentication, or unexpected-status failure.
    #[error("Drive request failed: {0}")]
    Transport(String),
    /// The requested file or folder id does not exist or is not visible.
    #[error("Drive item not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for DriveError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

/// Document formats the pipeline knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// Plain text.
    Txt,
}

impl FileKind {
    /// Every supported kind, in the default request order.
    pub const ALL: [FileKind; 3] = [FileKind::Pdf, FileKind::Docx, FileKind::Txt];

    /// Media type the backend reports for this kind.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Txt => "text/plain",
        }
    }

    /// Lowercase extension without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }

    /// Map a media type back onto a known kind.
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime_type() == mime_type)
    }

    /// Parse a file extension, case-insensitively and with or without a leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Txt => "TXT",
        })
    }
}

/// Remote file identity as returned by a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Backend-unique identifier.
    pub id: String,
    /// Display name, including its extension.
    pub name: String,
    /// Media type reported by the backend.
    #[serde(default)]
    pub mime_type: String,
    /// Size in bytes as a decimal string; native documents report none.
    #[serde(default)]
    pub size: Option<String>,
    /// RFC3339 creation timestamp.
    #[serde(default)]
    pub created_time: Option<String>,
    /// RFC3339 modification timestamp.
    #[serde(default)]
    pub modified_time: Option<String>,
}

/// Folder metadata used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInfo {
    /// Backend-unique identifier.
    pub id: String,
    /// Folder display name.
    pub name: String,
    /// Media type reported by the backend.
    #[serde(default)]
    pub mime_type: String,
    /// RFC3339 creation timestamp.
    #[serde(default)]
    pub created_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileListResponse {
    #[serde(default)]
    pub(crate) files: Vec<FileDescriptor>,
    #[serde(default)]
    pub(crate) next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_parse_case_insensitively() {
        assert_eq!(FileKind::from_extension(".PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_extension("Docx"), Some(FileKind::Docx));
        assert_eq!(FileKind::from_extension("txt"), Some(FileKind::Txt));
        assert_eq!(FileKind::from_extension("xyz"), None);
        assert_eq!(FileKind::from_extension(""), None);
    }

    #[test]
    fn mime_types_round_trip_through_kinds() {
        for kind in FileKind::ALL {
            assert_eq!(FileKind::from_mime_type(kind.mime_type()), Some(kind));
        }
        assert_eq!(
            FileKind::from_mime_type("application/vnd.google-apps.document"),
            None
        );
    }

    #[test]
    fn descriptor_reads_backend_field_names() {
        let descriptor: FileDescriptor = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "name": "notes.txt",
            "mimeType": "text/plain",
            "size": "42",
            "createdTime": "2024-01-01T00:00:00Z"
        }))
        .expect("descriptor");

        assert_eq!(descriptor.mime_type, "text/plain");
        assert_eq!(descriptor.size.as_deref(), Some("42"));
        assert_eq!(descriptor.modified_time, None);
    }
}
