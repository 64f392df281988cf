use unicode_normalization::UnicodeNormalization;

/// Normalizes free text by stripping surrounding whitespace and
/// decomposing it into Unicode Normalization Form D.
///
/// ```
/// use cleanpath::normalization::normalize_text;
/// assert_eq!(normalize_text(" Caf\u{e9} "), "Cafe\u{301}");
/// ```
pub fn normalize_text(text: impl AsRef<str>) -> String {
    text.as_ref().trim().nfd().collect()
}

/// Folds text for case-insensitive matching. Inner and surrounding
/// whitespace are preserved so that matching stays a plain substring
/// test.
///
/// ```
/// use cleanpath::normalization::fold_for_search;
/// assert_eq!(fold_for_search("Public TOILET"), "public toilet");
/// ```
pub fn fold_for_search(text: impl AsRef<str>) -> String {
    text.as_ref().nfd().collect::<String>().to_lowercase()
}
