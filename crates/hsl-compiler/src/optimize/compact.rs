//! Offset compaction.
//!
//! Structural passes shuffle the state vector and leave the stored ids
//! stale; this pass re-stamps every id to its position so the lowered rule
//! table comes out contiguous and monotonically offset-ordered by state id.

use crate::ir::{Machine, StateId};

pub(super) fn run(machine: &mut Machine) -> bool {
    let mut changed = false;
    for (index, state) in machine.states.iter_mut().enumerate() {
        let id = StateId(index as u32);
        if state.id != id {
            state.id = id;
            changed = true;
        }
    }
    changed
}
