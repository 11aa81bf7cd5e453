//! Report rendering for a finished [`ResultSet`](crate::processing::ResultSet).
//!
//! Both renderers are pure functions of their input: they never re-sort rows and never
//! consult configuration. CSV output is byte-identical for identical input; PDF output
//! differs only in the embedded generation timestamp.

mod csv;
mod pdf;

use thiserror::Error;

pub use self::csv::{CSV_FILENAME, render_csv};
pub use self::pdf::{PDF_FILENAME, render_pdf};

/// Errors raised while rendering a report.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("Error generating CSV: {0}")]
    Csv(#[from] ::csv::Error),
    /// PDF assembly failed.
    #[error("Error generating PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    /// Output buffer could not be written.
    #[error("Error writing report: {0}")]
    Io(#[from] std::io::Error),
    /// Generation timestamp could not be formatted.
    #[error("Error formatting report timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
