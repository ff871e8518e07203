use super::strings::{StrId, StringPool};

#[test]
fn a_fresh_pool_reserves_the_empty_string() {
    let pool = StringPool::new();
    assert_eq!(pool.resolve(StrId::EMPTY), Some(""));
    assert_eq!(pool.into_table(), vec![""]);
}

#[test]
fn interning_the_empty_string_reuses_id_zero() {
    let mut pool = StringPool::new();
    assert_eq!(pool.intern(""), StrId::EMPTY);
    assert_eq!(pool.into_table().len(), 1);
}

#[test]
fn ids_are_dense_in_first_use_order() {
    let mut pool = StringPool::new();
    let kw = pool.intern("keyword_control");
    let pattern = pool.intern(r"\b(if|else)\b");
    assert_eq!(kw.get(), 1);
    assert_eq!(pattern.get(), 2);
}

#[test]
fn duplicate_content_collapses_to_one_id() {
    let mut pool = StringPool::new();
    let a = pool.intern("scope");
    let b = pool.intern("scope");
    assert_eq!(a, b);
    assert_eq!(pool.into_table(), vec!["", "scope"]);
}

#[test]
fn into_table_preserves_id_order() {
    let mut pool = StringPool::new();
    pool.intern("zz");
    pool.intern("aa");
    assert_eq!(pool.into_table(), vec!["", "zz", "aa"]);
}

#[test]
fn resolve_roundtrips() {
    let mut pool = StringPool::new();
    let id = pool.intern("meta_tag");
    assert_eq!(pool.resolve(id), Some("meta_tag"));
}
