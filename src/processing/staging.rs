//! Transient on-disk copies of downloaded files.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A downloaded file written to the staging directory.
///
/// The file is removed when the value is dropped, so the copy lives exactly as long as one
/// iteration of the batch loop.
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Write `bytes` into a fresh file under `dir`, keeping the extension of `name`.
    pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let suffix = Path::new(name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("drivedigest-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "Staged download");
        Ok(Self { file })
    }

    /// Location of the staged copy.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Owned copy of the staged path, for handing to a blocking worker.
    pub fn path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Remove the staged copy now, logging rather than failing when removal does not succeed.
    pub fn remove(self) {
        let path = self.path_buf();
        if let Err(error) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %error, "Failed to remove staged file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_file_keeps_extension_and_is_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let staged = StagedFile::write(dir.path(), "Report.Final.PDF", b"bytes").expect("stage");
        let path = staged.path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("PDF"));
        assert_eq!(std::fs::read(&path).expect("read"), b"bytes");

        staged.remove();
        assert!(!path.exists());
    }

    #[test]
    fn dropping_a_staged_file_removes_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = {
            let staged = StagedFile::write(&dir.path().join("nested"), "notes", b"x").expect("stage");
            staged.path_buf()
        };
        assert!(!path.exists());
    }
}
