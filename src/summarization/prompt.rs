//! Deterministic pre-processing applied before every model call.

/// Appended to input text that was cut to fit the input budget.
pub const TRUNCATION_MARKER: &str = "...\n[Content truncated]";

/// Standing instruction sent alongside every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates concise, informative summaries of documents. Focus on extracting key information and main ideas.";

const UNTITLED: &str = "Untitled";

/// Cut `text` to `budget` characters, appending [`TRUNCATION_MARKER`] when anything was removed.
pub fn truncate_input(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&text[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text.to_string(),
    }
}

/// Assemble the user prompt for a document, labelling it with its filename.
pub fn build_prompt(text: &str, filename: &str) -> String {
    let label = match filename.trim() {
        "" => UNTITLED,
        name => name,
    };
    format!(
        "Please provide a concise summary of the following document.\n\
         Focus on the main points, key findings, and important information.\n\n\
         Document: {label}\n\n\
         Content:\n{text}\n\n\
         Summary:"
    )
}

/// Rough token count (one token per four characters), for diagnostics only.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_within_budget_passes_through() {
        assert_eq!(truncate_input("short", 5), "short");
        assert_eq!(truncate_input("", 0), "");
    }

    #[test]
    fn text_over_budget_is_cut_and_marked() {
        let text = "a".repeat(20);
        let truncated = truncate_input(&text, 12);
        assert_eq!(truncated, format!("{}{TRUNCATION_MARKER}", "a".repeat(12)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let truncated = truncate_input(&text, 4);
        assert!(truncated.starts_with("éééé..."));
        assert_eq!(
            truncated.chars().count(),
            4 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn prompt_uses_placeholder_for_missing_filename() {
        assert!(build_prompt("body", "  ").contains("Document: Untitled"));
        let prompt = build_prompt("body text", "report.pdf");
        assert!(prompt.contains("Document: report.pdf"));
        assert!(prompt.contains("Content:\nbody text\n\nSummary:"));
    }

    #[test]
    fn token_estimate_is_a_quarter_of_the_characters() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens("abc"), 0);
    }
}
