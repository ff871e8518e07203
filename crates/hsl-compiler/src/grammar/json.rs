//! Raw deserialization structs shared by the JSON and plist paths.
//!
//! TextMate grammars use camelCase keys and string-keyed capture maps; the
//! raw structs mirror that surface exactly and are converted into the
//! validated tree in one pass. Unknown keys are ignored by serde, which
//! matches the "preserved but ignored" contract.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{
    Capture, Captures, ContainerRule, Grammar, IncludeTarget, MatchRule, Rule, SpanRule,
};
use super::GrammarError;

#[derive(Debug, Deserialize)]
pub(crate) struct RawGrammar {
    #[serde(rename = "scopeName", default)]
    scope_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "fileTypes", default)]
    file_types: Vec<String>,
    #[serde(rename = "firstLineMatch", default)]
    first_line_match: Option<String>,
    #[serde(rename = "foldingStartMarker", default)]
    folding_start_marker: Option<String>,
    #[serde(rename = "foldingStopMarker", default)]
    folding_stop_marker: Option<String>,
    #[serde(default)]
    patterns: Vec<RawRule>,
    #[serde(default)]
    repository: IndexMap<String, RawRule>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRule {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "match", default)]
    match_pattern: Option<String>,
    #[serde(default)]
    begin: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(rename = "while", default)]
    while_pattern: Option<String>,
    #[serde(rename = "contentName", default)]
    content_name: Option<String>,
    #[serde(default)]
    captures: Option<IndexMap<String, RawCapture>>,
    #[serde(rename = "beginCaptures", default)]
    begin_captures: Option<IndexMap<String, RawCapture>>,
    #[serde(rename = "endCaptures", default)]
    end_captures: Option<IndexMap<String, RawCapture>>,
    #[serde(default)]
    include: Option<String>,
    #[serde(default)]
    patterns: Option<Vec<RawRule>>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawCapture {
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<RawGrammar> for Grammar {
    type Error = GrammarError;

    fn try_from(raw: RawGrammar) -> Result<Self, GrammarError> {
        let patterns = convert_rules(raw.patterns)?;

        let mut repository = IndexMap::with_capacity(raw.repository.len());
        for (key, rule) in raw.repository {
            let rule = convert_rule(rule, 0)?;
            repository.insert(key, rule);
        }

        Ok(Self {
            scope_name: raw.scope_name,
            name: raw.name,
            file_types: raw.file_types,
            first_line_match: raw.first_line_match,
            folding_start_marker: raw.folding_start_marker,
            folding_stop_marker: raw.folding_stop_marker,
            patterns,
            repository,
        })
    }
}

fn convert_rules(raw: Vec<RawRule>) -> Result<Vec<Rule>, GrammarError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, rule)| convert_rule(rule, i))
        .collect()
}

/// Classify a raw rule into exactly one of the four shapes.
fn convert_rule(raw: RawRule, index: usize) -> Result<Rule, GrammarError> {
    let label = || Rule::describe(raw.name.as_deref(), index);

    if let Some(reference) = raw.include {
        return Ok(Rule::Include(IncludeTarget::parse(&reference)));
    }

    if raw.while_pattern.is_some() {
        return Ok(Rule::Unsupported { feature: "while" });
    }

    if let Some(pattern) = raw.match_pattern {
        if raw.begin.is_some() || raw.end.is_some() {
            return Err(GrammarError::AmbiguousRule(label()));
        }
        let captures = convert_captures(raw.captures, &label)?;
        return Ok(Rule::Match(MatchRule {
            pattern,
            name: raw.name,
            captures,
        }));
    }

    if let Some(begin) = raw.begin {
        let Some(end) = raw.end else {
            return Err(GrammarError::MissingEnd(label()));
        };
        // Plain `captures` is TextMate shorthand for identical begin and end
        // captures.
        let shorthand = raw.captures.clone();
        let begin_captures =
            convert_captures(raw.begin_captures.or_else(|| shorthand.clone()), &label)?;
        let end_captures = convert_captures(raw.end_captures.or(shorthand), &label)?;
        let patterns = convert_rules(raw.patterns.unwrap_or_default())?;
        return Ok(Rule::Span(SpanRule {
            begin,
            end,
            name: raw.name,
            content_name: raw.content_name,
            begin_captures,
            end_captures,
            patterns,
        }));
    }

    if raw.end.is_some() {
        return Err(GrammarError::MissingBegin(label()));
    }

    if let Some(patterns) = raw.patterns {
        return Ok(Rule::Container(ContainerRule {
            patterns: convert_rules(patterns)?,
        }));
    }

    Err(GrammarError::EmptyRule(label()))
}

fn convert_captures(
    raw: Option<IndexMap<String, RawCapture>>,
    label: &impl Fn() -> String,
) -> Result<Captures, GrammarError> {
    let Some(raw) = raw else {
        return Ok(BTreeMap::new());
    };

    let mut captures = BTreeMap::new();
    for (key, capture) in raw {
        let group: u32 = key.parse().map_err(|_| GrammarError::BadCaptureKey {
            rule: label(),
            key: key.clone(),
        })?;
        // Entries without a name assign no scope and carry no information.
        if let Some(name) = capture.name {
            captures.insert(group, Capture { name });
        }
    }
    Ok(captures)
}
