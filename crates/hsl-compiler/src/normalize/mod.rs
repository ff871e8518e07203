//! Normalization: grammar tree → closed, well-typed state machine.
//!
//! Steps, in order:
//! 1. validate the tree against the feature policy (all offenders in one
//!    error under strict mode)
//! 2. expand includes and lower rules to states and transitions
//! 3. normalize scope names and merge scopes that coincide afterwards
//! 4. verify reachability-relative scope-stack balance

mod convert;
mod predicates;
mod transforms;
mod validate;
mod verify;

#[cfg(test)]
mod convert_tests;
#[cfg(test)]
mod normalize_tests;

use crate::diagnostics::Diagnostics;
use crate::grammar::Grammar;
use crate::ir::Machine;

/// Which grammar features a compilation accepts.
///
/// Strict mode rejects unsupported constructs up front; non-strict mode
/// skips them with a diagnostic but never silently changes the semantics of
/// supported ones.
#[derive(Debug, Clone)]
pub struct FeaturePolicy {
    pub strict: bool,
}

impl Default for FeaturePolicy {
    fn default() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("grammar has an empty scopeName")]
    MissingScopeName,

    #[error("unsupported features: {}", .0.join(", "))]
    UnsupportedFeatures(Vec<String>),

    #[error("include cycle: {}", .0.join(" -> "))]
    IncludeCycle(Vec<String>),

    #[error("unknown repository entry `{0}`")]
    UnknownRepositoryEntry(String),

    #[error("invalid regex `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("unbalanced scope stack at state {0}")]
    UnbalancedScopeStack(u32),
}

/// Run the normalizer.
pub fn normalize(
    grammar: &Grammar,
    policy: &FeaturePolicy,
) -> Result<(Machine, Diagnostics), NormalizeError> {
    if grammar.scope_name.trim().is_empty() {
        return Err(NormalizeError::MissingScopeName);
    }

    let mut diagnostics = Diagnostics::new();
    validate::check_features(grammar, policy, &mut diagnostics)?;

    let mut machine = convert::convert(grammar, &mut diagnostics)?;
    transforms::apply(&mut machine);
    verify::verify_balance(&machine)?;

    Ok((machine, diagnostics))
}
