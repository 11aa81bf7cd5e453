use super::ExportError;
use crate::processing::ResultSet;

/// Attachment name used when the CSV report is downloaded.
pub const CSV_FILENAME: &str = "summaries.csv";

const BASE_HEADER: [&str; 4] = ["File Name", "Type", "Size", "Summary"];
const URL_HEADER: &str = "File URL";
const STATUS_HEADER: &str = "Status";

/// Render `results` as CSV, one row per file in input order.
///
/// The `File URL` column is only present when at least one row carries a url; rows without
/// one get an empty cell.
pub fn render_csv(results: &ResultSet) -> Result<Vec<u8>, ExportError> {
    let with_urls = results.has_urls();
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = BASE_HEADER.to_vec();
    if with_urls {
        header.push(URL_HEADER);
    }
    header.push(STATUS_HEADER);
    writer.write_record(&header)?;

    for file in &results.files {
        let mut record = vec![
            file.name.as_str(),
            file.mime_type.as_str(),
            file.size.as_str(),
            file.summary.as_str(),
        ];
        if with_urls {
            record.push(file.url.as_deref().unwrap_or_default());
        }
        record.push(file.status.as_str());
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| ExportError::Io(error.into_error()))?;
    tracing::debug!(rows = results.files.len(), bytes = bytes.len(), "Rendered CSV report");
    Ok(bytes)
}
