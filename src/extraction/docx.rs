use docx_rs::{DocumentChild, ParagraphChild, RunChild, read_docx};

/// Concatenate every body paragraph's text in document order, newline-joined and trimmed.
pub(super) fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let docx = read_docx(bytes).map_err(|error| error.to_string())?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(&paragraph.children)),
            _ => None,
        })
        .collect();

    tracing::debug!(paragraphs = paragraphs.len(), "Extracted DOCX text");
    Ok(paragraphs.join("\n").trim().to_string())
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(value) => text.push_str(&value.text),
                    RunChild::Tab(_) => text.push('\t'),
                    _ => {}
                }
            }
        }
    }
    text
}
