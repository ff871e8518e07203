//! Scope-stack balance verification.
//!
//! Assigns each reachable state a nesting depth: push transitions deepen,
//! pop transitions shallow, everything else stays level. A state reached at
//! two different depths, a pop out of depth 0, or a final state away from
//! depth 0 all mean an unbalanced stack.

use std::collections::VecDeque;

use crate::ir::{Machine, StackEffect};

use super::NormalizeError;

pub(super) fn verify_balance(machine: &Machine) -> Result<(), NormalizeError> {
    if machine.states.is_empty() {
        return Ok(());
    }
    if let Err((state, reason)) = machine.check_consistency() {
        panic!("normalizer produced an inconsistent machine at state {state:?}: {reason}");
    }

    let mut depth: Vec<Option<u32>> = vec![None; machine.states.len()];
    depth[Machine::INITIAL.index()] = Some(0);

    let mut queue = VecDeque::from([Machine::INITIAL]);
    while let Some(id) = queue.pop_front() {
        let here = depth[id.index()].expect("queued state has a depth");
        for t in &machine.state(id).transitions {
            let next = match t.stack {
                StackEffect::None => here,
                StackEffect::Push => here + 1,
                StackEffect::Pop => here
                    .checked_sub(1)
                    .ok_or(NormalizeError::UnbalancedScopeStack(id.0))?,
            };
            match depth[t.target.index()] {
                None => {
                    depth[t.target.index()] = Some(next);
                    queue.push_back(t.target);
                }
                Some(existing) if existing != next => {
                    return Err(NormalizeError::UnbalancedScopeStack(t.target.0));
                }
                Some(_) => {}
            }
        }
    }

    // Every terminating path must end with all regions closed.
    for state in &machine.states {
        if state.is_final
            && let Some(d) = depth[state.id.index()]
            && d != 0
        {
            return Err(NormalizeError::UnbalancedScopeStack(state.id.0));
        }
    }
    Ok(())
}
