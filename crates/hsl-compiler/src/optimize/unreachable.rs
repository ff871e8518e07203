//! Dead-state elimination.
//!
//! BFS from the initial state, then drop everything unvisited. Ids compact
//! in the same round's `compact-offsets` pass.

use crate::ir::Machine;

pub(super) fn run(machine: &mut Machine) -> bool {
    if machine.states.is_empty() {
        return false;
    }
    let reachable = machine.reachable();
    machine.retain_states(&reachable)
}
