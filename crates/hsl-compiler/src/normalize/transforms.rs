//! Semantic transforms that preserve observable tokenization.
//!
//! Scope names are normalized to the HSL convention and scopes whose
//! normalized names coincide are merged, with every action reference
//! rewritten. Applied uniformly, before any table interning.

use hsl_core::normalize_scope_name;

use crate::ir::Machine;

pub(super) fn apply(machine: &mut Machine) {
    if machine.scopes.is_empty() {
        return;
    }
    let remap = machine.scopes.rewrite_names(normalize_scope_name);
    for action in &mut machine.actions {
        action.remap_scope(&remap);
    }
}
