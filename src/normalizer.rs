// 🧹 Text Normalizer
// Collapses the run-on whitespace that layout-preserving PDF extraction leaves behind.
//
// Only the agreement-number search reads normalized text. The competency scanner
// works on the raw text because date disambiguation depends on the original
// character adjacency.

/// Collapse every run of whitespace to a single space and trim both ends
///
/// # Examples:
/// ```
/// use dcp_analyzer::normalize_text;
/// assert_eq!(normalize_text("a  \n\t b"), "a b");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Same as [`normalize_text`] for inputs that may be absent
pub fn normalize_optional(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================
