use super::action::Action;
use super::machine::{Machine, StackEffect, Transition};
use super::predicate::Predicate;
use super::StateId;

fn edge(target: StateId) -> Transition {
    Transition {
        guard: Predicate::Any,
        target,
        priority: 50,
        consume: true,
        stack: StackEffect::None,
        actions: Vec::new(),
    }
}

#[test]
fn alloc_assigns_dense_ids() {
    let mut m = Machine::new();
    let a = m.alloc_state(true);
    let b = m.alloc_state(false);
    assert_eq!(a, StateId(0));
    assert_eq!(b, StateId(1));
    assert_eq!(m.states.len(), 2);
}

#[test]
fn reachability_follows_transitions() {
    let mut m = Machine::new();
    let root = m.alloc_state(true);
    let mid = m.alloc_state(false);
    let _island = m.alloc_state(false);
    let leaf = m.alloc_state(true);

    m.push_transition(root, edge(mid));
    m.push_transition(mid, edge(leaf));

    assert_eq!(m.reachable(), vec![true, true, false, true]);
}

#[test]
fn retain_states_remaps_targets() {
    let mut m = Machine::new();
    let root = m.alloc_state(true);
    let _dead = m.alloc_state(false);
    let leaf = m.alloc_state(false);
    m.push_transition(root, edge(leaf));

    let changed = m.retain_states(&[true, false, true]);
    assert!(changed);
    assert_eq!(m.states.len(), 2);
    assert_eq!(m.states[0].transitions[0].target, StateId(1));
}

#[test]
fn retain_all_reports_no_change() {
    let mut m = Machine::new();
    m.alloc_state(true);
    assert!(!m.retain_states(&[true]));
}

#[test]
fn scope_rewrite_merges_duplicates() {
    let mut m = Machine::new();
    let a = m.scopes.intern("keyword.control");
    let b = m.scopes.intern("keyword-control");
    let c = m.scopes.intern("other");
    assert_ne!(a, b);

    let remap = m.scopes.rewrite_names(hsl_core::normalize_scope_name);
    assert_eq!(remap[a.index()], remap[b.index()]);
    assert_ne!(remap[a.index()], remap[c.index()]);
    assert_eq!(m.scopes.len(), 2);
    assert_eq!(m.scopes.resolve(remap[a.index()]), "keyword_control");
}

#[test]
fn action_fingerprints_are_order_sensitive() {
    let mut m = Machine::new();
    let s = m.scopes.intern("x");
    let push = m.alloc_action(Action::PushScope {
        scope: s,
        capture: None,
    });
    let pop = m.alloc_action(Action::PopScope { count: 1 });

    let ab = m.action_fingerprint(&[push, pop]);
    let ba = m.action_fingerprint(&[pop, push]);
    assert_ne!(ab, ba);
    assert_eq!(m.action_fingerprint(&[]), "");
}

#[test]
fn consistency_flags_dangling_targets() {
    let mut m = Machine::new();
    let root = m.alloc_state(true);
    m.push_transition(root, edge(StateId(9)));
    assert!(m.check_consistency().is_err());
}
