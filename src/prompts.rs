//! Prompt text for the simplification request.

/// Instruction prepended to the extracted document text.
pub const SIMPLIFY_DIRECTIVE: &str = "Please simplify the following legal document content into plain English that a non-lawyer can easily understand. Make it clear, concise, and avoid legal jargon:";

/// Build the single-part prompt: directive, blank line, full document text.
///
/// The text is sent whole. There is no chunking or truncation, so very
/// long documents can exceed the model's input window; the upstream then
/// answers 400 and the caller sees `UpstreamBadRequest`.
pub fn simplification_prompt(document_text: &str) -> String {
    format!("{SIMPLIFY_DIRECTIVE}\n\n{document_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_directive_then_text() {
        let p = simplification_prompt("This Agreement shall terminate upon breach.");
        assert!(p.starts_with(SIMPLIFY_DIRECTIVE));
        assert!(p.ends_with("\n\nThis Agreement shall terminate upon breach."));
    }

    #[test]
    fn prompt_does_not_truncate() {
        let long = "clause ".repeat(50_000);
        let p = simplification_prompt(&long);
        assert_eq!(p.len(), SIMPLIFY_DIRECTIVE.len() + 2 + long.len());
    }
}
