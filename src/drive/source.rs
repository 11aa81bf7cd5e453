//! Capability interface over the folder backend.

use async_trait::async_trait;

use super::filters::FileFilter;
use super::types::{DriveError, FileDescriptor, FolderInfo};

/// Folder backend contract consumed by the batch orchestrator.
#[async_trait]
pub trait FolderSource: Send + Sync {
    /// List non-trashed, non-folder entries matching `filter`, flattened across pages.
    async fn list(&self, filter: &FileFilter) -> Result<Vec<FileDescriptor>, DriveError>;

    /// Retrieve a file's raw content in full.
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>, DriveError>;

    /// Retrieve display metadata for a folder.
    async fn metadata(&self, folder_id: &str) -> Result<FolderInfo, DriveError>;
}
