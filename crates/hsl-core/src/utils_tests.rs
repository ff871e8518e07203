use super::utils::normalize_scope_name;

#[test]
fn replaces_separators() {
    assert_eq!(normalize_scope_name("keyword.control"), "keyword_control");
    assert_eq!(normalize_scope_name("comment-line"), "comment_line");
}

#[test]
fn strips_common_prefixes() {
    assert_eq!(normalize_scope_name("source.rust"), "rust");
    assert_eq!(normalize_scope_name("text.html.basic"), "html_basic");
    // only one prefix layer is stripped
    assert_eq!(normalize_scope_name("source.text.plain"), "text_plain");
}

#[test]
fn trims_whitespace() {
    assert_eq!(normalize_scope_name("  string.quoted  "), "string_quoted");
}

#[test]
fn plain_names_pass_through() {
    assert_eq!(normalize_scope_name("keyword"), "keyword");
}

#[test]
fn is_idempotent() {
    let once = normalize_scope_name("source.meta.block-comment");
    assert_eq!(normalize_scope_name(&once), once);
}
