use indoc::indoc;

use super::types::{IncludeTarget, Rule};
use super::{from_json, from_plist, GrammarError};

#[test]
fn match_rule() {
    let grammar = from_json(
        indoc! {r#"
        {
          "scopeName": "source.t",
          "patterns": [
            { "match": "\\b(if|else)\\b", "name": "keyword.control" }
          ]
        }
    "#}
        .as_bytes(),
    )
    .unwrap();

    assert_eq!(grammar.scope_name, "source.t");
    assert_eq!(grammar.patterns.len(), 1);
    let Rule::Match(rule) = &grammar.patterns[0] else {
        panic!("expected match rule");
    };
    assert_eq!(rule.pattern, r"\b(if|else)\b");
    assert_eq!(rule.name.as_deref(), Some("keyword.control"));
    assert!(rule.captures.is_empty());
}

#[test]
fn span_rule_with_children() {
    let grammar = from_json(
        indoc! {r#"
        {
          "scopeName": "source.t",
          "patterns": [
            {
              "begin": "\"",
              "end": "\"",
              "name": "string.quoted",
              "contentName": "meta.inside",
              "patterns": [
                { "match": "\\\\.", "name": "constant.escape" }
              ]
            }
          ]
        }
    "#}
        .as_bytes(),
    )
    .unwrap();

    let Rule::Span(span) = &grammar.patterns[0] else {
        panic!("expected span rule");
    };
    assert_eq!(span.begin, "\"");
    assert_eq!(span.end, "\"");
    assert_eq!(span.content_name.as_deref(), Some("meta.inside"));
    assert_eq!(span.patterns.len(), 1);
}

#[test]
fn captures_are_sorted_by_group() {
    let grammar = from_json(
        indoc! {r#"
        {
          "scopeName": "source.t",
          "patterns": [
            {
              "match": "(a)(b)",
              "captures": {
                "2": { "name": "two" },
                "1": { "name": "one" },
                "0": { "name": "all" }
              }
            }
          ]
        }
    "#}
        .as_bytes(),
    )
    .unwrap();

    let Rule::Match(rule) = &grammar.patterns[0] else {
        panic!("expected match rule");
    };
    let groups: Vec<u32> = rule.captures.keys().copied().collect();
    assert_eq!(groups, vec![0, 1, 2]);
    assert_eq!(rule.captures[&2].name, "two");
}

#[test]
fn nameless_captures_are_dropped() {
    let grammar = from_json(
        br#"{"scopeName":"source.t","patterns":[{"match":"(a)","captures":{"1":{}}}]}"#,
    )
    .unwrap();

    let Rule::Match(rule) = &grammar.patterns[0] else {
        panic!("expected match rule");
    };
    assert!(rule.captures.is_empty());
}

#[test]
fn include_targets() {
    let grammar = from_json(
        indoc! {r##"
        {
          "scopeName": "source.t",
          "patterns": [
            { "include": "$self" },
            { "include": "$base" },
            { "include": "#kw" },
            { "include": "kw" },
            { "include": "source.js" }
          ]
        }
    "##}
        .as_bytes(),
    )
    .unwrap();

    let targets: Vec<_> = grammar
        .patterns
        .iter()
        .map(|r| match r {
            Rule::Include(t) => t.clone(),
            other => panic!("expected include, got {other:?}"),
        })
        .collect();

    assert_eq!(
        targets,
        vec![
            IncludeTarget::SelfRef,
            IncludeTarget::Base,
            IncludeTarget::Repository("kw".to_owned()),
            IncludeTarget::Repository("kw".to_owned()),
            IncludeTarget::External("source.js".to_owned()),
        ]
    );
}

#[test]
fn container_rule() {
    let grammar = from_json(
        br#"{"scopeName":"source.t","patterns":[{"patterns":[{"match":"x"}]}]}"#,
    )
    .unwrap();
    assert!(matches!(&grammar.patterns[0], Rule::Container(c) if c.patterns.len() == 1));
}

#[test]
fn while_rule_is_kept_as_unsupported() {
    let grammar = from_json(
        br#"{"scopeName":"source.t","patterns":[{"begin":"a","while":"b"}]}"#,
    )
    .unwrap();
    assert!(matches!(
        &grammar.patterns[0],
        Rule::Unsupported { feature: "while" }
    ));
}

#[test]
fn repository_preserves_order() {
    let grammar = from_json(
        indoc! {r#"
        {
          "scopeName": "source.t",
          "repository": {
            "zz": { "match": "z" },
            "aa": { "match": "a" }
          }
        }
    "#}
        .as_bytes(),
    )
    .unwrap();

    let keys: Vec<_> = grammar.repository.keys().cloned().collect();
    assert_eq!(keys, vec!["zz", "aa"]);
}

#[test]
fn match_and_begin_is_ambiguous() {
    let err = from_json(
        br#"{"scopeName":"source.t","patterns":[{"match":"a","begin":"b","end":"c"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, GrammarError::AmbiguousRule(_)));
}

#[test]
fn begin_without_end_is_rejected() {
    let err =
        from_json(br#"{"scopeName":"source.t","patterns":[{"begin":"a"}]}"#).unwrap_err();
    assert!(matches!(err, GrammarError::MissingEnd(_)));
}

#[test]
fn end_without_begin_is_rejected() {
    let err = from_json(br#"{"scopeName":"source.t","patterns":[{"end":"a"}]}"#).unwrap_err();
    assert!(matches!(err, GrammarError::MissingBegin(_)));
}

#[test]
fn shapeless_rule_is_rejected() {
    let err = from_json(br#"{"scopeName":"source.t","patterns":[{"name":"x"}]}"#).unwrap_err();
    assert!(matches!(err, GrammarError::EmptyRule(_)));
    assert_eq!(err.to_string(), "rule `x` has no `match`, `begin`, `include`, or `patterns`");
}

#[test]
fn bad_capture_key_is_rejected() {
    let err = from_json(
        br#"{"scopeName":"source.t","patterns":[{"match":"a","captures":{"one":{"name":"n"}}}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, GrammarError::BadCaptureKey { .. }));
}

#[test]
fn malformed_json_is_rejected() {
    let err = from_json(b"{not json").unwrap_err();
    assert!(matches!(err, GrammarError::Json(_)));
}

#[test]
fn plist_grammar_parses() {
    let data = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
        <plist version="1.0">
        <dict>
            <key>scopeName</key>
            <string>source.t</string>
            <key>patterns</key>
            <array>
                <dict>
                    <key>match</key>
                    <string>foo</string>
                    <key>name</key>
                    <string>keyword</string>
                </dict>
            </array>
        </dict>
        </plist>
    "#};

    let grammar = from_plist(data.as_bytes()).unwrap();
    assert_eq!(grammar.scope_name, "source.t");
    assert!(matches!(&grammar.patterns[0], Rule::Match(m) if m.pattern == "foo"));
}

#[test]
fn unknown_keys_are_ignored() {
    let grammar = from_json(
        br#"{"scopeName":"source.t","uuid":"123","comment":"x","patterns":[]}"#,
    )
    .unwrap();
    assert!(grammar.patterns.is_empty());
}
