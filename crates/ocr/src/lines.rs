/// OCR output prepared for the resolvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptText {
    /// Untouched OCR output, used for substring search.
    pub full_text: String,
    /// Non-blank lines in reading order, trimmed, case preserved.
    pub lines: Vec<String>,
}

/// Split raw OCR text into its non-blank lines.
pub fn split(raw: &str) -> ReceiptText {
    let lines = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    ReceiptText { full_text: raw.to_string(), lines }
}
