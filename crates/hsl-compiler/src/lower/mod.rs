//! Flattening: state machine → dense tables.
//!
//! Assigns every id the tokenizer will ever see. Scope-table ids go out in
//! sorted normalized-name order; string and regex ids follow the emission
//! walk (states by id, transitions in order), so two runs over the same
//! machine produce identical tables.

mod tables;


use std::collections::BTreeMap;

use hsl_bytecode::{
    CaptureMapping, Program, RuleAction, RuleEntry, ScopeEntry, StateEntry, NEXT_STATE_POP,
    NEXT_STATE_STAY, SCOPE_NONE, STATE_FINAL, STATE_POP, STATE_PUSH,
};

use hsl_core::StringPool;

use crate::emit::EmitError;
use crate::ir::{Action, Machine, ScopeId, StackEffect};

use tables::RegexTableBuilder;

pub fn lower(machine: &Machine) -> Result<Program, EmitError> {
    if machine.states.len() > i32::MAX as usize {
        return Err(EmitError::TableOverflow("state", machine.states.len()));
    }

    let mut strings = StringPool::new();

    // Scope table: used scopes only, sorted by normalized name.
    let scope_map = collect_scopes(machine)?;
    let mut scope_table = Vec::with_capacity(scope_map.len());
    for (name, table_id) in scope_map.ordered() {
        scope_table.push(ScopeEntry {
            id: table_id,
            name_index: strings.intern(name).get(),
            parent: SCOPE_NONE,
        });
    }

    // States walk in id order; every transition becomes one rule entry.
    let mut regexes = RegexTableBuilder::new();
    let mut state_table = Vec::with_capacity(machine.states.len());
    let mut rule_table = Vec::new();

    let pop_targets = pop_targets(machine);

    for (index, state) in machine.states.iter().enumerate() {
        if state.transitions.len() > u16::MAX as usize {
            return Err(EmitError::TableOverflow("rule", state.transitions.len()));
        }

        let rule_offset = rule_table.len() as u32;
        let mut has_push = false;

        for t in &state.transitions {
            let pattern = t.guard.to_pattern();
            let regex_id = regexes.intern(&pattern, t.guard.is_simple(), &mut strings);

            let (action, next_state) = match t.stack {
                StackEffect::Push => {
                    has_push = true;
                    (RuleAction::PushScope, t.target.0 as i32)
                }
                StackEffect::Pop => (RuleAction::PopScope, NEXT_STATE_POP),
                StackEffect::None if t.target.index() == index => {
                    (RuleAction::Match, NEXT_STATE_STAY)
                }
                StackEffect::None => (RuleAction::Transition, t.target.0 as i32),
            };

            let mut scope_id = SCOPE_NONE;
            let mut captures = Vec::new();
            for action_id in &t.actions {
                match &machine.actions[action_id.index()] {
                    Action::SetScope(scope) | Action::PushScope { scope, .. } => {
                        if scope_id == SCOPE_NONE {
                            scope_id = scope_map.resolve(*scope);
                        }
                    }
                    Action::CaptureGroup { group, scope } => {
                        captures.push(CaptureMapping {
                            group: *group,
                            scope: scope_map.resolve(*scope),
                        });
                    }
                    Action::PopScope { .. } | Action::EmitToken { .. } => {}
                }
            }
            if captures.len() > u8::MAX as usize {
                return Err(EmitError::TableOverflow("capture", captures.len()));
            }

            rule_table.push(RuleEntry {
                regex_id,
                action,
                next_state,
                scope_id,
                priority: t.priority,
                captures,
            });
        }

        let mut flags = 0u8;
        if state.is_final {
            flags |= STATE_FINAL;
        }
        if has_push {
            flags |= STATE_PUSH;
        }
        if pop_targets.contains(&index) {
            flags |= STATE_POP;
        }

        state_table.push(StateEntry {
            id: index as u32,
            rule_offset,
            rule_count: state.transitions.len() as u16,
            flags,
        });
    }

    Ok(Program {
        string_table: strings.into_table(),
        regex_table: regexes.finish(),
        scope_table,
        state_table,
        rule_table,
    })
}

/// States entered by a pop transition carry the `POP` flag: they are where
/// control lands when a region closes.
fn pop_targets(machine: &Machine) -> std::collections::BTreeSet<usize> {
    machine
        .states
        .iter()
        .flat_map(|s| &s.transitions)
        .filter(|t| t.stack == StackEffect::Pop)
        .map(|t| t.target.index())
        .collect()
}

/// Mapping from machine scope ids to table ids, ordered by name.
struct ScopeMap {
    by_name: BTreeMap<String, (u16, ScopeId)>,
    table_ids: Vec<u16>,
}

impl ScopeMap {
    fn len(&self) -> usize {
        self.by_name.len()
    }

    fn resolve(&self, scope: ScopeId) -> u16 {
        self.table_ids[scope.index()]
    }

    /// `(name, table_id)` pairs in table order.
    fn ordered(&self) -> impl Iterator<Item = (&str, u16)> {
        self.by_name
            .iter()
            .map(|(name, &(table_id, _))| (name.as_str(), table_id))
    }
}

fn collect_scopes(machine: &Machine) -> Result<ScopeMap, EmitError> {
    // Only scopes still referenced by a surviving action list make the
    // table; optimization may have orphaned the rest.
    let mut used = std::collections::BTreeSet::new();
    for state in &machine.states {
        let action_lists = state
            .transitions
            .iter()
            .map(|t| &t.actions)
            .chain([&state.on_entry, &state.on_exit]);
        for list in action_lists {
            for action_id in list {
                if let Some(scope) = machine.actions[action_id.index()].scope() {
                    used.insert(scope);
                }
            }
        }
    }

    let mut by_name = BTreeMap::new();
    for &scope in &used {
        by_name.insert(machine.scopes.resolve(scope).to_owned(), (0u16, scope));
    }
    if by_name.len() >= SCOPE_NONE as usize {
        return Err(EmitError::TableOverflow("scope", by_name.len()));
    }
    for (table_id, entry) in by_name.values_mut().enumerate() {
        entry.0 = table_id as u16;
    }

    let mut table_ids = vec![SCOPE_NONE; machine.scopes.len()];
    for &(table_id, scope) in by_name.values() {
        table_ids[scope.index()] = table_id;
    }

    Ok(ScopeMap { by_name, table_ids })
}
