//! Plain-text extraction for downloaded documents, dispatched by file extension.
//!
//! Only `.pdf`, `.docx`, and `.txt` are recognized. Every parser failure is wrapped in
//! [`ExtractionError`] so library error types never leak to callers.

mod docx;
mod pdf;
mod text;

use crate::drive::FileKind;
use std::path::Path;
use thiserror::Error;

/// Default minimum trimmed length accepted by [`is_valid`].
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 10;

/// Errors raised while turning document bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Extension is not one of the supported document formats.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    /// Plain-text content could not be decoded.
    #[error("Error decoding text from {file}: {message}")]
    Decode {
        /// File whose content failed to decode.
        file: String,
        /// Decoder diagnostic.
        message: String,
    },
    /// Underlying document parser rejected the content.
    #[error("Error extracting text from {format} file {file}: {message}")]
    Parse {
        /// File whose content failed to parse.
        file: String,
        /// Format the parser was attempting.
        format: FileKind,
        /// Parser diagnostic.
        message: String,
    },
    /// Staged file could not be read back from disk.
    #[error("Error reading {file}: {source}")]
    Io {
        /// File that could not be read.
        file: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Extract text from in-memory bytes, dispatching on `extension`.
pub fn extract(bytes: &[u8], extension: &str) -> Result<String, ExtractionError> {
    extract_labeled(bytes, extension, "document")
}

/// Read a staged file and extract its text, dispatching on the path's extension.
pub fn extract_file(path: &Path) -> Result<String, ExtractionError> {
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    extract_file_as(path, &label)
}

/// Like [`extract_file`], but errors name the file as `label` rather than by its path.
///
/// Staged downloads live under temporary names; callers pass the original file name here.
pub fn extract_file_as(path: &Path, label: &str) -> Result<String, ExtractionError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = resolve_kind(&extension)?;
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        file: label.to_string(),
        source,
    })?;
    extract_kind(&bytes, kind, label)
}

/// Return `false` for empty or whitespace-only text, or text shorter than `min_length`
/// characters once trimmed.
pub fn is_valid(text: &str, min_length: usize) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() >= min_length
}

fn extract_labeled(bytes: &[u8], extension: &str, label: &str) -> Result<String, ExtractionError> {
    let kind = resolve_kind(extension)?;
    extract_kind(bytes, kind, label)
}

fn resolve_kind(extension: &str) -> Result<FileKind, ExtractionError> {
    FileKind::from_extension(extension).ok_or_else(|| {
        let shown = extension.trim().trim_start_matches('.').to_lowercase();
        ExtractionError::UnsupportedFormat(format!(".{shown}"))
    })
}

fn extract_kind(bytes: &[u8], kind: FileKind, label: &str) -> Result<String, ExtractionError> {
    let text = match kind {
        FileKind::Pdf => pdf::extract_pdf(bytes),
        FileKind::Docx => docx::extract_docx(bytes),
        FileKind::Txt => {
            return text::decode_text(bytes).map_err(|message| ExtractionError::Decode {
                file: label.to_string(),
                message,
            });
        }
    };
    text.map_err(|message| ExtractionError::Parse {
        file: label.to_string(),
        format: kind,
        message,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::{docx_with_paragraphs, pdf_with_pages};
    use super::*;

    #[test]
    fn utf8_text_is_decoded_and_trimmed() {
        let text = extract("  héllo wörld \n".as_bytes(), "txt").expect("text");
        assert_eq!(text, "héllo wörld");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        // 0xE9 is 'é' in Latin-1 and an incomplete sequence in UTF-8.
        let bytes = b"caf\xE9 au lait";
        assert!(std::str::from_utf8(bytes).is_err());
        let text = extract(bytes, ".TXT").expect("latin-1 fallback");
        assert_eq!(text, "café au lait");
    }

    #[test]
    fn binary_content_fails_to_decode() {
        let error = extract(b"\xFF\x00\xFE", "txt").expect_err("binary");
        assert!(matches!(error, ExtractionError::Decode { .. }));
    }

    #[test]
    fn unsupported_extension_never_falls_through() {
        let error = extract(b"plain words", ".xyz").expect_err("unsupported");
        assert!(matches!(error, ExtractionError::UnsupportedFormat(ext) if ext == ".xyz"));

        let error = extract(b"plain words", "").expect_err("missing extension");
        assert!(matches!(error, ExtractionError::UnsupportedFormat(_)));
    }

    #[test]
    fn pdf_pages_are_joined_in_order() {
        let bytes = pdf_with_pages(&["First page", "Second page"]);
        let text = extract(&bytes, "pdf").expect("pdf text");
        let first = text.find("First page").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second);
        assert_eq!(text, text.trim());
    }

    #[test]
    fn corrupt_pdf_is_wrapped() {
        let error = extract(b"%PDF-1.5 definitely not a pdf", "pdf").expect_err("corrupt");
        assert!(matches!(
            error,
            ExtractionError::Parse { format: FileKind::Pdf, .. }
        ));
    }

    #[test]
    fn docx_paragraphs_are_newline_joined() {
        let bytes = docx_with_paragraphs(&["Alpha", "Beta"]);
        let text = extract(&bytes, "DOCX").expect("docx text");
        assert_eq!(text, "Alpha\nBeta");
    }

    #[test]
    fn corrupt_docx_is_wrapped() {
        let error = extract(b"PK not really a zip", "docx").expect_err("corrupt");
        assert!(matches!(
            error,
            ExtractionError::Parse { format: FileKind::Docx, .. }
        ));
    }

    #[test]
    fn extract_file_names_the_file_in_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"garbage").expect("write");

        let error = extract_file(&path).expect_err("corrupt");
        assert!(error.to_string().contains("broken.pdf"));
    }

    #[test]
    fn extract_file_as_reports_the_given_label() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("drivedigest-a1b2c3.docx");
        std::fs::write(&path, b"PK not really a zip").expect("write");

        let error = extract_file_as(&path, "Quarterly notes.docx").expect_err("corrupt");
        let message = error.to_string();
        assert!(message.contains("Quarterly notes.docx"));
        assert!(!message.contains("drivedigest-a1b2c3"));
    }

    #[test]
    fn extract_file_reads_staged_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "  staged notes  ").expect("write");

        assert_eq!(extract_file(&path).expect("text"), "staged notes");
    }

    #[test]
    fn validity_rejects_blank_and_short_text() {
        assert!(!is_valid("", DEFAULT_MIN_TEXT_LENGTH));
        assert!(!is_valid("   \n\t ", 1));
        assert!(!is_valid("  short  ", DEFAULT_MIN_TEXT_LENGTH));
        assert!(is_valid("long enough text", DEFAULT_MIN_TEXT_LENGTH));
        assert!(is_valid("Hello", 1));
    }
}
