use lopdf::Document;

/// Concatenate the text of every page in page order, newline-joined and trimmed.
pub(super) fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let document = Document::load_mem(bytes).map_err(|error| error.to_string())?;
    let pages = document.get_pages();

    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|error| format!("page {page_number}: {error}"))?;
        text.push_str(page_text.trim_end_matches('\n'));
        text.push('\n');
    }

    tracing::debug!(pages = pages.len(), chars = text.len(), "Extracted PDF text");
    Ok(text.trim().to_string())
}
