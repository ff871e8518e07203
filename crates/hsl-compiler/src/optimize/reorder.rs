//! Priority ordering.
//!
//! Stable sort of each state's transitions by descending priority; ties keep
//! insertion (source) order. Reports a change only when some state was
//! actually out of order, which makes the pass idempotent.

use crate::ir::Machine;

pub(super) fn run(machine: &mut Machine) -> bool {
    let mut changed = false;
    for state in &mut machine.states {
        let sorted = state
            .transitions
            .windows(2)
            .all(|w| w[0].priority >= w[1].priority);
        if !sorted {
            state
                .transitions
                .sort_by(|a, b| b.priority.cmp(&a.priority));
            changed = true;
        }
    }
    changed
}
