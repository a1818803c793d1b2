//! Literal term matching over extracted text

/// Lines of `text` that contain `term`, in document order
///
/// Returns `None` when `term` does not occur anywhere in `text`. Matching is
/// case-sensitive and byte-exact: no case folding, no whitespace or Unicode
/// normalization. An empty term matches every line.
///
/// A term spanning a line break occurs in the text but in no single line;
/// that yields `Some` with no lines.
///
/// # Examples
///
/// ```
/// use docsieve::search::matcher::matching_lines;
///
/// let text = "hola\nmundo IGV\nfin";
/// assert_eq!(matching_lines(text, "IGV"), Some(vec!["mundo IGV"]));
/// assert_eq!(matching_lines(text, "igv"), None);
/// ```
pub fn matching_lines<'t>(text: &'t str, term: &str) -> Option<Vec<&'t str>> {
    if !text.contains(term) {
        return None;
    }

    Some(text.lines().filter(|line| line.contains(term)).collect())
}
