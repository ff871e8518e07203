//! The validated grammar tree.
//!
//! Mirrors the source document, with every rule classified into exactly one
//! shape. Built once by the loader and immutable afterwards.

use std::collections::BTreeMap;

use indexmap::IndexMap;

/// A complete grammar document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grammar {
    /// Dotted identifier like `source.rust`. Required, checked by the
    /// normalizer.
    pub scope_name: String,
    pub name: Option<String>,
    pub file_types: Vec<String>,
    pub first_line_match: Option<String>,
    pub folding_start_marker: Option<String>,
    pub folding_stop_marker: Option<String>,
    /// Ordered top-level patterns.
    pub patterns: Vec<Rule>,
    /// Named library of reusable rules. Insertion order is preserved so
    /// diagnostics and expansion stay deterministic.
    pub repository: IndexMap<String, Rule>,
}

/// Numbered capture groups mapped to scope names. Key 0 is the whole match.
/// Sorted by group index.
pub type Captures = BTreeMap<u32, Capture>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
}

/// A grammar rule: exactly one of the four shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Match(MatchRule),
    Span(SpanRule),
    Include(IncludeTarget),
    Container(ContainerRule),
    /// A recognized-but-unsupported construct (e.g. a `while` rule). Kept in
    /// the tree so the normalizer can report every offender in one error.
    Unsupported { feature: &'static str },
}

/// A single-regex rule.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchRule {
    pub pattern: String,
    pub name: Option<String>,
    pub captures: Captures,
}

/// A begin/end region with nested patterns.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanRule {
    pub begin: String,
    pub end: String,
    pub name: Option<String>,
    pub content_name: Option<String>,
    pub begin_captures: Captures,
    pub end_captures: Captures,
    pub patterns: Vec<Rule>,
}

/// A container with only nested patterns.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerRule {
    pub patterns: Vec<Rule>,
}

/// Parsed form of an `include` reference string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncludeTarget {
    /// `$self` - the grammar's own top-level patterns.
    SelfRef,
    /// `$base` - the base grammar (empty in v1).
    Base,
    /// `#name` or a bare `name` - a repository entry.
    Repository(String),
    /// A reference into another grammar (`source.js`, `text.html#tag`).
    /// Recognized so the normalizer can reject it by name.
    External(String),
}

impl IncludeTarget {
    pub fn parse(reference: &str) -> Self {
        match reference {
            "$self" => Self::SelfRef,
            "$base" => Self::Base,
            _ => {
                if let Some(name) = reference.strip_prefix('#') {
                    Self::Repository(name.to_owned())
                } else if reference.contains('.') || reference.contains('#') {
                    Self::External(reference.to_owned())
                } else {
                    Self::Repository(reference.to_owned())
                }
            }
        }
    }
}

impl Rule {
    /// Descriptive label used in loader error messages.
    pub(crate) fn describe(name: Option<&str>, index: usize) -> String {
        match name {
            Some(name) => format!("`{name}`"),
            None => format!("#{index}"),
        }
    }
}
