//! Google Drive folder backend integration.

pub mod client;
pub mod filters;
/// Streaming helpers for paginated folder listings.
pub mod pager;
pub mod source;
pub mod types;

pub use client::DriveClient;
pub use filters::{FOLDER_MIME_TYPE, FileFilter};
pub use source::FolderSource;
pub use types::{DriveError, FileDescriptor, FileKind, FolderInfo};

/// Browser link for a file, derived from its id.
pub fn view_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{file_id}/view")
}
