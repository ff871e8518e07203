//! Scope-stack and token actions attached to transitions.

use std::fmt;

use super::{ActionId, ScopeId};

/// An atomic effect executed when a transition fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Enter a scope. `capture` links the push to a numbered capture group
    /// when the scope came from one.
    PushScope {
        scope: ScopeId,
        capture: Option<u8>,
    },
    /// Leave `count >= 1` scopes.
    PopScope { count: u8 },
    /// Set the scope attached to the current rule's token.
    SetScope(ScopeId),
    /// Emit the text of capture group `group` (0 = whole match) as a token.
    /// The tokenizer supplies the concrete text range.
    EmitToken { group: u8 },
    /// Assign a scope to a numbered capture group.
    CaptureGroup { group: u8, scope: ScopeId },
}

impl Action {
    /// The scope this action references, if any.
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            Self::PushScope { scope, .. } | Self::SetScope(scope) | Self::CaptureGroup { scope, .. } => {
                Some(*scope)
            }
            Self::PopScope { .. } | Self::EmitToken { .. } => None,
        }
    }

    /// Rewrite the referenced scope through `remap`.
    pub fn remap_scope(&mut self, remap: &[ScopeId]) {
        match self {
            Self::PushScope { scope, .. } | Self::SetScope(scope) | Self::CaptureGroup { scope, .. } => {
                *scope = remap[scope.index()];
            }
            Self::PopScope { .. } | Self::EmitToken { .. } => {}
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushScope {
                scope,
                capture: None,
            } => write!(f, "push-scope:{}", scope.0),
            Self::PushScope {
                scope,
                capture: Some(group),
            } => write!(f, "push-scope:{}@{}", scope.0, group),
            Self::PopScope { count } => write!(f, "pop-scope:{count}"),
            Self::SetScope(scope) => write!(f, "set-scope:{}", scope.0),
            Self::EmitToken { group } => write!(f, "emit-token:{group}"),
            Self::CaptureGroup { group, scope } => write!(f, "capture:{}:{}", group, scope.0),
        }
    }
}

/// Deterministic fingerprint of an action sequence, used by the optimizer's
/// equivalence signatures.
pub fn fingerprint_actions(arena: &[Action], ids: &[ActionId]) -> String {
    let mut out = String::new();
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        out.push_str(&arena[id.index()].to_string());
    }
    out
}
