//! Feature-policy enforcement.
//!
//! Walks the whole tree collecting unsupported constructs so strict mode can
//! report every offender in a single error instead of stopping at the first.

use indexmap::IndexSet;

use crate::diagnostics::Diagnostics;
use crate::grammar::{Grammar, IncludeTarget, Rule};

use super::{FeaturePolicy, NormalizeError};

pub(super) fn check_features(
    grammar: &Grammar,
    policy: &FeaturePolicy,
    diagnostics: &mut Diagnostics,
) -> Result<(), NormalizeError> {
    let mut found = IndexSet::new();

    for rule in grammar
        .patterns
        .iter()
        .chain(grammar.repository.values())
    {
        collect(rule, &mut found);
    }

    if found.is_empty() {
        return Ok(());
    }

    if policy.strict {
        return Err(NormalizeError::UnsupportedFeatures(
            found.into_iter().collect(),
        ));
    }
    for feature in found {
        diagnostics.warn(format!("skipping unsupported feature: {feature}"));
    }
    Ok(())
}

fn collect(rule: &Rule, found: &mut IndexSet<String>) {
    match rule {
        Rule::Unsupported { feature } => {
            found.insert((*feature).to_owned());
        }
        Rule::Include(IncludeTarget::External(_)) => {
            found.insert("cross-grammar include".to_owned());
        }
        Rule::Include(_) => {}
        Rule::Match(m) => {
            check_pattern(&m.pattern, found);
        }
        Rule::Span(span) => {
            check_pattern(&span.begin, found);
            check_pattern(&span.end, found);
            for child in &span.patterns {
                collect(child, found);
            }
        }
        Rule::Container(c) => {
            for child in &c.patterns {
                collect(child, found);
            }
        }
    }
}

fn check_pattern(pattern: &str, found: &mut IndexSet<String>) {
    if contains_lookbehind(pattern) {
        found.insert("lookbehind".to_owned());
    }
}

/// Detect `(?<=` / `(?<!` while leaving named groups `(?<name>` alone.
pub(super) fn contains_lookbehind(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i + 3 < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if &bytes[i..i + 3] == b"(?<" && matches!(bytes[i + 3], b'=' | b'!') {
            return true;
        }
        i += 1;
    }
    false
}
