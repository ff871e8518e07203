use crate::diagnostics::Diagnostics;
use crate::grammar::{from_json, Grammar};
use crate::ir::{Action, Machine, StackEffect, StateId};

use super::convert::convert;
use super::NormalizeError;

fn grammar(json: &str) -> Grammar {
    from_json(json.as_bytes()).expect("valid grammar json")
}

fn lowered(json: &str) -> Machine {
    let mut diagnostics = Diagnostics::new();
    convert(&grammar(json), &mut diagnostics).expect("convertible grammar")
}

#[test]
fn empty_patterns_yield_one_final_state() {
    let m = lowered(r#"{"scopeName":"source.t","patterns":[]}"#);
    assert_eq!(m.states.len(), 1);
    assert!(m.states[0].is_final);
    assert!(m.states[0].transitions.is_empty());
}

#[test]
fn match_rule_self_loops_on_the_initial_state() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[{"match":"\\b(if|else)\\b","name":"keyword.control"}]}"#,
    );

    assert_eq!(m.states.len(), 1);
    let state = &m.states[0];
    assert!(state.is_final);
    assert_eq!(state.transitions.len(), 1);

    let t = &state.transitions[0];
    assert_eq!(t.target, StateId(0));
    assert_eq!(t.stack, StackEffect::None);
    assert!(t.consume);
    // 50 base + 10 for the name
    assert_eq!(t.priority, 60);

    let actions: Vec<&Action> = t.actions.iter().map(|a| &m.actions[a.index()]).collect();
    assert!(matches!(actions[0], Action::SetScope(_)));
    assert!(matches!(actions[1], Action::EmitToken { group: 0 }));
}

#[test]
fn span_rule_allocates_body_and_exit() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[{"begin":"\"","end":"\"","name":"string.quoted"}]}"#,
    );

    assert_eq!(m.states.len(), 3);
    let (root, body, exit) = (&m.states[0], &m.states[1], &m.states[2]);

    assert!(root.is_final);
    assert!(!body.is_final);
    assert!(exit.is_final);

    let begin = &root.transitions[0];
    assert_eq!(begin.stack, StackEffect::Push);
    assert_eq!(begin.target, StateId(1));
    let begin_actions: Vec<&Action> =
        begin.actions.iter().map(|a| &m.actions[a.index()]).collect();
    assert!(matches!(begin_actions[0], Action::PushScope { .. }));

    let end = &body.transitions[0];
    assert_eq!(end.stack, StackEffect::Pop);
    assert_eq!(end.target, StateId(2));
    let end_actions: Vec<&Action> =
        end.actions.iter().map(|a| &m.actions[a.index()]).collect();
    assert!(matches!(end_actions[0], Action::PopScope { count: 1 }));
}

#[test]
fn content_name_pushes_a_second_scope() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[{"begin":"a","end":"b","name":"outer","contentName":"inner"}]}"#,
    );

    let begin = &m.states[0].transitions[0];
    let pushes = begin
        .actions
        .iter()
        .filter(|a| matches!(m.actions[a.index()], Action::PushScope { .. }))
        .count();
    assert_eq!(pushes, 2);

    let end = &m.states[1].transitions[0];
    assert!(end
        .actions
        .iter()
        .any(|a| matches!(m.actions[a.index()], Action::PopScope { count: 2 })));
}

#[test]
fn nested_span_exit_is_not_final() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[
            {"begin":"a","end":"b","name":"outer","patterns":[
                {"begin":"c","end":"d","name":"inner"}
            ]}
        ]}"#,
    );

    // root, outer body, outer exit, inner body, inner exit
    assert_eq!(m.states.len(), 5);
    let outer_exit = &m.states[2];
    let inner_exit = &m.states[4];
    assert!(outer_exit.is_final);
    assert!(!inner_exit.is_final);
}

#[test]
fn child_rules_live_in_the_body_before_the_end_rule() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[
            {"begin":"\"","end":"\"","name":"string","patterns":[
                {"match":"\\\\.","name":"escape"}
            ]}
        ]}"#,
    );

    let body = &m.states[1];
    assert_eq!(body.transitions.len(), 2);
    // Source order: the child first, then the end transition.
    assert_eq!(body.transitions[0].stack, StackEffect::None);
    assert_eq!(body.transitions[1].stack, StackEffect::Pop);
}

#[test]
fn span_captures_land_on_both_transitions() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[
            {"begin":"<(\\w+)>","end":"</(\\w+)>","name":"meta.tag",
             "beginCaptures":{"1":{"name":"entity.name"}},
             "endCaptures":{"1":{"name":"entity.name"}}}
        ]}"#,
    );

    let has_capture = |t: &crate::ir::Transition| {
        t.actions
            .iter()
            .any(|a| matches!(m.actions[a.index()], Action::CaptureGroup { group: 1, .. }))
    };
    let begin = &m.states[0].transitions[0];
    let end = &m.states[1].transitions[0];
    assert!(has_capture(begin));
    assert!(has_capture(end));
}

#[test]
fn captures_produce_capture_actions() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[
            {"match":"(a)(b)","captures":{"1":{"name":"one"},"2":{"name":"two"}}}
        ]}"#,
    );

    let t = &m.states[0].transitions[0];
    // 50 base + 5 for captures
    assert_eq!(t.priority, 55);
    let groups: Vec<u8> = t
        .actions
        .iter()
        .filter_map(|a| match m.actions[a.index()] {
            Action::CaptureGroup { group, .. } => Some(group),
            _ => None,
        })
        .collect();
    assert_eq!(groups, vec![1, 2]);
}

#[test]
fn container_rules_flatten_into_their_context() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[
            {"patterns":[{"match":"a","name":"x"},{"match":"b","name":"y"}]}
        ]}"#,
    );
    assert_eq!(m.states.len(), 1);
    assert_eq!(m.states[0].transitions.len(), 2);
}

#[test]
fn repository_include_is_inlined() {
    let with_include = lowered(
        r##"{"scopeName":"source.t",
            "repository":{"kw":{"match":"foo","name":"k"}},
            "patterns":[{"include":"#kw"}]}"##,
    );
    let inline = lowered(r#"{"scopeName":"source.t","patterns":[{"match":"foo","name":"k"}]}"#);

    // Inclusion and inlining are indistinguishable downstream.
    assert_eq!(with_include, inline);
}

#[test]
fn unknown_repository_entry_is_an_error() {
    let mut diagnostics = Diagnostics::new();
    let err = convert(
        &grammar(r##"{"scopeName":"source.t","patterns":[{"include":"#missing"}]}"##),
        &mut diagnostics,
    )
    .unwrap_err();
    assert!(
        matches!(&err, NormalizeError::UnknownRepositoryEntry(name) if name == "missing"),
        "unexpected error {err}"
    );
}

#[test]
fn include_cycle_names_every_participant() {
    let mut diagnostics = Diagnostics::new();
    let err = convert(
        &grammar(
            r##"{"scopeName":"source.t",
                "repository":{
                    "a":{"patterns":[{"include":"#b"}]},
                    "b":{"patterns":[{"include":"#a"}]}
                },
                "patterns":[{"include":"#a"}]}"##,
        ),
        &mut diagnostics,
    )
    .unwrap_err();

    let NormalizeError::IncludeCycle(path) = err else {
        panic!("expected include cycle, got {err}");
    };
    assert_eq!(path, vec!["a", "b", "a"]);
    assert_eq!(
        NormalizeError::IncludeCycle(path).to_string(),
        "include cycle: a -> b -> a"
    );
}

#[test]
fn self_include_expands_top_level_once() {
    let m = lowered(
        r#"{"scopeName":"source.t","patterns":[
            {"match":"a","name":"x"},
            {"begin":"b","end":"c","name":"region","patterns":[{"include":"$self"}]}
        ]}"#,
    );

    // The body received a copy of both top-level rules: the match self-loop
    // and the span's begin transition, plus its own end transition.
    let body = &m.states[1];
    assert_eq!(body.transitions.len(), 3);
}

#[test]
fn reentrant_self_include_truncates_instead_of_looping() {
    let mut diagnostics = Diagnostics::new();
    let m = convert(
        &grammar(r#"{"scopeName":"source.t","patterns":[{"include":"$self"}]}"#),
        &mut diagnostics,
    )
    .unwrap();
    assert_eq!(m.states.len(), 1);
    assert!(m.states[0].transitions.is_empty());
    assert!(!diagnostics.is_empty());
}

#[test]
fn recursion_through_self_truncates_at_one_level() {
    // The classic idiom: a repository region that nests the whole language.
    let m = lowered(
        r##"{"scopeName":"source.t",
            "repository":{
                "block":{"begin":"\\{","end":"\\}","name":"block","patterns":[{"include":"$self"}]}
            },
            "patterns":[{"match":"x","name":"id"},{"include":"#block"}]}"##,
    );

    // root, block body, block exit; the block's `$self` splice keeps the
    // top-level match rule and cuts the re-entrant `#block` reference.
    assert_eq!(m.states.len(), 3);
    let body = &m.states[1];
    assert_eq!(body.transitions.len(), 2); // id copy, end

    // A top-level region's exit terminates the input even when the region
    // came through the repository.
    assert!(m.states[2].is_final);
}

#[test]
fn base_include_expands_to_nothing() {
    let m = lowered(r#"{"scopeName":"source.t","patterns":[{"include":"$base"}]}"#);
    assert_eq!(m.states.len(), 1);
    assert!(m.states[0].transitions.is_empty());
}

#[test]
fn invalid_regex_is_reported_with_its_pattern() {
    let mut diagnostics = Diagnostics::new();
    let err = convert(
        &grammar(r#"{"scopeName":"source.t","patterns":[{"match":"(unclosed"}]}"#),
        &mut diagnostics,
    )
    .unwrap_err();
    assert!(
        matches!(&err, NormalizeError::InvalidRegex { pattern, .. } if pattern == "(unclosed")
    );
}
