//! Equivalent-state merging via partition refinement.
//!
//! Hopcroft-style: start from the final/non-final split, refine by a sorted
//! transition signature (target class, canonical guard, priority, stack
//! effect, action fingerprint) plus the entry/exit action fingerprints,
//! until the partition stabilizes. Each class keeps its lowest-indexed state
//! as representative.

use std::collections::BTreeMap;

use crate::ir::{Machine, State, StateId};

pub(super) fn run(machine: &mut Machine) -> bool {
    let n = machine.states.len();
    if n <= 1 {
        return false;
    }

    let mut class: Vec<usize> = machine
        .states
        .iter()
        .map(|s| s.is_final as usize)
        .collect();

    loop {
        let mut assignment: BTreeMap<String, usize> = BTreeMap::new();
        let mut next_class = Vec::with_capacity(n);
        for (index, state) in machine.states.iter().enumerate() {
            // The state's own previous class is part of the signature, so
            // the partition only ever refines and the loop terminates.
            let sig = format!("c{};{}", class[index], signature(machine, state, &class));
            let fresh = assignment.len();
            next_class.push(*assignment.entry(sig).or_insert(fresh));
        }
        if next_class == class {
            break;
        }
        class = next_class;
    }

    // Representative = lowest index per class.
    let mut representative: BTreeMap<usize, usize> = BTreeMap::new();
    for (index, &c) in class.iter().enumerate() {
        representative.entry(c).or_insert(index);
    }
    if representative.len() == n {
        return false;
    }

    // Point every transition at its target's representative, then drop the
    // duplicates.
    for state in &mut machine.states {
        for t in &mut state.transitions {
            t.target = StateId(representative[&class[t.target.index()]] as u32);
        }
    }
    let keep: Vec<bool> = (0..n)
        .map(|i| representative[&class[i]] == i)
        .collect();
    machine.retain_states(&keep)
}

fn signature(machine: &Machine, state: &State, class: &[usize]) -> String {
    let mut edges: Vec<String> = state
        .transitions
        .iter()
        .map(|t| {
            format!(
                "{}|{}|{}|{}|{}|{}",
                class[t.target.index()],
                t.guard.canonical_form(),
                t.priority,
                t.stack.tag(),
                t.consume as u8,
                machine.action_fingerprint(&t.actions),
            )
        })
        .collect();
    edges.sort();

    format!(
        "f{};{};entry:{};exit:{}",
        state.is_final as u8,
        edges.join(","),
        machine.action_fingerprint(&state.on_entry),
        machine.action_fingerprint(&state.on_exit),
    )
}
