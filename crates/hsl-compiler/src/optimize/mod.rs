//! Structural optimization of the state machine.
//!
//! A fixed sequence of meaning-preserving passes, iterated until a full
//! round reports no change. Every pass is a plain function
//! `&mut Machine -> bool`; the driver is stateless. Passes must not fail on
//! well-formed machines - an inconsistency after a pass is a programmer
//! error surfaced as `OptimizeError::InvariantViolated`.

mod compact;
mod merge;
mod reorder;
mod simplify;
mod unreachable;


use crate::ir::Machine;

type PassFn = fn(&mut Machine) -> bool;

/// The pass pipeline, in execution order.
const PASSES: &[(&str, PassFn)] = &[
    ("remove-unreachable-states", unreachable::run),
    ("merge-equivalent-states", merge::run),
    ("simplify-transitions", simplify::run),
    ("reorder-by-priority", reorder::run),
    ("compact-offsets", compact::run),
];

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("optimizer invariant violated in pass `{pass}` at state {state}")]
    InvariantViolated { pass: &'static str, state: u32 },
}

/// Run all passes to a fixed point. Returns whether anything changed.
pub fn optimize(machine: &mut Machine) -> Result<bool, OptimizeError> {
    let mut any = false;
    loop {
        let mut changed = false;
        for &(name, pass) in PASSES {
            let pass_changed = pass(machine);
            if let Err((state, _)) = machine.check_consistency() {
                return Err(OptimizeError::InvariantViolated {
                    pass: name,
                    state: state.0,
                });
            }
            changed |= pass_changed;
        }
        any |= changed;
        if !changed {
            break;
        }
    }
    Ok(any)
}
