//! The state machine container.

use super::action::{fingerprint_actions, Action};
use super::predicate::Predicate;
use super::scope::ScopeSet;
use super::{ActionId, StateId};

/// Effect of a transition on the tokenizer's state stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StackEffect {
    /// Stay at the current nesting level.
    None,
    /// Enter a region (a `begin` match).
    Push,
    /// Leave a region (an `end` match).
    Pop,
}

impl StackEffect {
    pub(crate) fn tag(self) -> char {
        match self {
            Self::None => '.',
            Self::Push => '+',
            Self::Pop => '-',
        }
    }
}

/// A guarded, prioritized edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub guard: Predicate,
    pub target: StateId,
    pub priority: u8,
    pub consume: bool,
    pub stack: StackEffect,
    pub actions: Vec<ActionId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub id: StateId,
    pub transitions: Vec<Transition>,
    pub is_final: bool,
    pub on_entry: Vec<ActionId>,
    pub on_exit: Vec<ActionId>,
}

/// The whole machine: flat state storage plus the action and scope arenas.
///
/// Targets are positional: `transitions[i].target` indexes `states`. The
/// `id` field of each state is re-stamped by the `compact-offsets` pass
/// after structural passes shuffle the vector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Machine {
    pub states: Vec<State>,
    pub actions: Vec<Action>,
    pub scopes: ScopeSet,
}

impl Machine {
    /// The initial state.
    pub const INITIAL: StateId = StateId(0);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_state(&mut self, is_final: bool) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State {
            id,
            transitions: Vec::new(),
            is_final,
            on_entry: Vec::new(),
            on_exit: Vec::new(),
        });
        id
    }

    pub fn alloc_action(&mut self, action: Action) -> ActionId {
        let id = ActionId(self.actions.len() as u32);
        self.actions.push(action);
        id
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.index()]
    }

    pub fn push_transition(&mut self, from: StateId, transition: Transition) {
        self.states[from.index()].transitions.push(transition);
    }

    /// Per-state reachability from the initial state, BFS in transition
    /// order.
    pub fn reachable(&self) -> Vec<bool> {
        let mut visited = vec![false; self.states.len()];
        if self.states.is_empty() {
            return visited;
        }

        let mut queue = std::collections::VecDeque::from([Self::INITIAL]);
        visited[Self::INITIAL.index()] = true;
        while let Some(id) = queue.pop_front() {
            for t in &self.states[id.index()].transitions {
                if !visited[t.target.index()] {
                    visited[t.target.index()] = true;
                    queue.push_back(t.target);
                }
            }
        }
        visited
    }

    /// Fingerprint of an action-id sequence against this machine's arena.
    pub fn action_fingerprint(&self, ids: &[ActionId]) -> String {
        fingerprint_actions(&self.actions, ids)
    }

    /// Drop states whose `keep` slot is false, remapping every target.
    /// Kept states must not target dropped ones. Returns whether anything
    /// was dropped.
    pub fn retain_states(&mut self, keep: &[bool]) -> bool {
        assert_eq!(keep.len(), self.states.len());
        if keep.iter().all(|&k| k) {
            return false;
        }

        let mut remap = vec![u32::MAX; self.states.len()];
        let mut next = 0u32;
        for (i, &kept) in keep.iter().enumerate() {
            if kept {
                remap[i] = next;
                next += 1;
            }
        }

        let mut index = 0;
        self.states.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
        for state in &mut self.states {
            for t in &mut state.transitions {
                let new = remap[t.target.index()];
                assert_ne!(new, u32::MAX, "kept state targets a dropped state");
                t.target = StateId(new);
            }
        }
        true
    }

    /// Structural sanity: every target and action id is in range.
    /// Violations are programmer errors in whichever pass ran last.
    pub fn check_consistency(&self) -> Result<(), (StateId, &'static str)> {
        let states = self.states.len();
        let actions = self.actions.len();

        for (i, state) in self.states.iter().enumerate() {
            let here = StateId(i as u32);
            for t in &state.transitions {
                if t.target.index() >= states {
                    return Err((here, "transition target out of range"));
                }
                if t.actions.iter().any(|a| a.index() >= actions) {
                    return Err((here, "transition action out of range"));
                }
            }
            if state
                .on_entry
                .iter()
                .chain(&state.on_exit)
                .any(|a| a.index() >= actions)
            {
                return Err((here, "state action out of range"));
            }
        }
        Ok(())
    }
}
