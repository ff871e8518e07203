//! Transition cleanup.
//!
//! Three local rewrites per state, none of which cross a state boundary:
//! - drop transitions whose guard cannot match any input
//! - collapse duplicates (same target, guard, actions, stack effect)
//! - merge neighbors with identical target/actions/priority whose guards
//!   union into a single predicate (character sets, literal alternations)

use std::collections::BTreeSet;

use crate::ir::{fingerprint_actions, Action, Transition};
use crate::ir::Machine;

pub(super) fn run(machine: &mut Machine) -> bool {
    let Machine {
        states, actions, ..
    } = machine;

    let mut changed = false;
    for state in states {
        changed |= drop_unsatisfiable(&mut state.transitions);
        changed |= collapse_duplicates(&mut state.transitions, actions);
        changed |= merge_neighbors(&mut state.transitions, actions);
    }
    changed
}

fn drop_unsatisfiable(transitions: &mut Vec<Transition>) -> bool {
    let before = transitions.len();
    transitions.retain(|t| t.guard.is_satisfiable());
    transitions.len() != before
}

fn collapse_duplicates(transitions: &mut Vec<Transition>, actions: &[Action]) -> bool {
    let mut seen = BTreeSet::new();
    let before = transitions.len();
    transitions.retain(|t| {
        seen.insert(format!(
            "{}|{}|{}|{}",
            t.target.0,
            t.guard.canonical_form(),
            t.stack.tag(),
            fingerprint_actions(actions, &t.actions),
        ))
    });
    transitions.len() != before
}

fn merge_neighbors(transitions: &mut Vec<Transition>, actions: &[Action]) -> bool {
    let mut changed = false;
    let mut i = 0;
    while i + 1 < transitions.len() {
        let (a, b) = (&transitions[i], &transitions[i + 1]);
        let compatible = a.target == b.target
            && a.priority == b.priority
            && a.stack == b.stack
            && a.consume == b.consume
            && fingerprint_actions(actions, &a.actions)
                == fingerprint_actions(actions, &b.actions);

        if compatible && let Some(union) = a.guard.try_union(&b.guard) {
            transitions[i].guard = union;
            transitions.remove(i + 1);
            changed = true;
            // Re-check the same slot against the next neighbor.
            continue;
        }
        i += 1;
    }
    changed
}
