//! Small helpers shared across the workspace.

/// Normalize a TextMate scope name to the HSL convention.
///
/// Trims surrounding whitespace, strips one leading `source.` or `text.`
/// prefix, and replaces `.` and `-` with `_`.
///
/// # Examples
/// ```
/// use hsl_core::normalize_scope_name;
/// assert_eq!(normalize_scope_name("keyword.control"), "keyword_control");
/// assert_eq!(normalize_scope_name("source.string.quoted"), "string_quoted");
/// assert_eq!(normalize_scope_name(" text.comment-line "), "comment_line");
/// ```
pub fn normalize_scope_name(name: &str) -> String {
    let name = name.trim();
    let name = name
        .strip_prefix("source.")
        .or_else(|| name.strip_prefix("text."))
        .unwrap_or(name);

    name.chars()
        .map(|c| if c == '.' || c == '-' { '_' } else { c })
        .collect()
}
