use crate::grammar::from_json;
use crate::ir::Action;

use super::{normalize, FeaturePolicy, NormalizeError};

fn run(json: &str) -> Result<(crate::ir::Machine, crate::Diagnostics), NormalizeError> {
    let grammar = from_json(json.as_bytes()).expect("valid grammar json");
    normalize(&grammar, &FeaturePolicy::default())
}

#[test]
fn missing_scope_name_is_rejected() {
    let err = run(r#"{"patterns":[]}"#).unwrap_err();
    assert!(matches!(err, NormalizeError::MissingScopeName));

    let err = run(r#"{"scopeName":"  ","patterns":[]}"#).unwrap_err();
    assert!(matches!(err, NormalizeError::MissingScopeName));
}

#[test]
fn scope_names_are_normalized_and_merged() {
    let (machine, _) = run(
        r#"{"scopeName":"source.t","patterns":[
            {"match":"a","name":"keyword.control"},
            {"match":"b","name":"keyword-control"},
            {"match":"c","name":"source.other"}
        ]}"#,
    )
    .unwrap();

    let names: Vec<&str> = machine.scopes.iter().map(|(_, name)| name).collect();
    assert_eq!(names, vec!["keyword_control", "other"]);

    // Both keyword rules now reference the same scope id.
    let scope_of = |i: usize| {
        machine.states[0].transitions[i]
            .actions
            .iter()
            .find_map(|a| match machine.actions[a.index()] {
                Action::SetScope(s) => Some(s),
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(scope_of(0), scope_of(1));
    assert_ne!(scope_of(0), scope_of(2));
}

#[test]
fn strict_mode_lists_every_unsupported_feature_at_once() {
    let err = run(
        r#"{"scopeName":"source.t","patterns":[
            {"begin":"a","while":"b"},
            {"include":"source.js"},
            {"match":"(?<=x)y","name":"bad"}
        ]}"#,
    )
    .unwrap_err();

    let NormalizeError::UnsupportedFeatures(features) = &err else {
        panic!("expected unsupported features");
    };
    assert_eq!(
        features,
        &["while", "cross-grammar include", "lookbehind"]
    );
    insta::assert_snapshot!(
        err.to_string(),
        @"unsupported features: while, cross-grammar include, lookbehind"
    );
}

#[test]
fn non_strict_mode_skips_with_diagnostics() {
    let grammar = from_json(
        br#"{"scopeName":"source.t","patterns":[
            {"begin":"a","while":"b"},
            {"match":"x","name":"id"}
        ]}"#,
    )
    .unwrap();

    let (machine, diagnostics) =
        normalize(&grammar, &FeaturePolicy { strict: false }).unwrap();

    // The supported rule still compiles.
    assert_eq!(machine.states[0].transitions.len(), 1);
    assert!(diagnostics.iter().any(|d| d.message.contains("while")));
}

#[test]
fn named_group_is_not_mistaken_for_lookbehind() {
    let result = run(
        r#"{"scopeName":"source.t","patterns":[{"match":"(?<word>[a-z]+)","name":"id"}]}"#,
    );
    // Named groups are an Oniguruma spelling; the pattern lowers to a
    // complex regex rather than tripping the lookbehind rejection.
    assert!(result.is_ok());
}

#[test]
fn balanced_spans_verify() {
    let result = run(
        r#"{"scopeName":"source.t","patterns":[
            {"begin":"a","end":"b","name":"outer","patterns":[
                {"begin":"c","end":"d","name":"inner"}
            ]}
        ]}"#,
    );
    assert!(result.is_ok());
}

#[test]
fn repository_chain_resolves() {
    let (machine, _) = run(
        r##"{"scopeName":"source.t",
            "repository":{
                "outer":{"patterns":[{"include":"#innermost"}]},
                "innermost":{"match":"z","name":"deep"}
            },
            "patterns":[{"include":"#outer"}]}"##,
    )
    .unwrap();

    assert_eq!(machine.states.len(), 1);
    let t = &machine.states[0].transitions[0];
    // Base 50 + name 10; repository hops add nothing.
    assert_eq!(t.priority, 60);
}

#[test]
fn lookahead_only_guard_does_not_consume() {
    let (machine, _) = run(
        r#"{"scopeName":"source.t","patterns":[{"match":"(?=x)","name":"peek"}]}"#,
    )
    .unwrap();
    assert!(!machine.states[0].transitions[0].consume);
}
