//! Grammar loading: JSON (primary) and plist/XML (secondary) documents.
//!
//! The loader validates surface syntax only: every rule is classified into
//! exactly one of the four shapes (match, span, include, container), capture
//! keys are checked to be non-negative integers, and nothing else. Feature
//! support and reference resolution belong to the normalizer.

mod json;
mod types;

#[cfg(test)]
mod json_tests;

pub use types::{
    Capture, Captures, ContainerRule, Grammar, IncludeTarget, MatchRule, Rule, SpanRule,
};

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid JSON grammar: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid plist grammar: {0}")]
    Plist(#[from] plist::Error),

    #[error("grammar is neither valid JSON nor a valid plist")]
    UnknownFormat,

    #[error("rule {0} has both `match` and `begin`")]
    AmbiguousRule(String),

    #[error("rule {0} has `begin` but no `end`")]
    MissingEnd(String),

    #[error("rule {0} has `end` but no `begin`")]
    MissingBegin(String),

    #[error("rule {0} has no `match`, `begin`, `include`, or `patterns`")]
    EmptyRule(String),

    #[error("rule {rule}: capture key {key:?} is not a non-negative integer")]
    BadCaptureKey { rule: String, key: String },

    #[error("failed to read grammar file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load a grammar from disk, picking the format from the extension and
/// falling back to trying JSON then plist.
pub fn load_grammar(path: &Path) -> Result<Grammar, GrammarError> {
    let data = std::fs::read(path).map_err(|source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&data),
        Some("plist") | Some("tmLanguage") => from_plist(&data),
        // Unknown extension: whichever format parses decides; its shape
        // errors are real errors, not a reason to try the other format.
        _ => match serde_json::from_slice::<json::RawGrammar>(&data) {
            Ok(raw) => raw.try_into(),
            Err(_) => match plist::from_bytes::<json::RawGrammar>(&data) {
                Ok(raw) => raw.try_into(),
                Err(_) => Err(GrammarError::UnknownFormat),
            },
        },
    }
}

/// Parse a JSON grammar document.
pub fn from_json(data: &[u8]) -> Result<Grammar, GrammarError> {
    let raw: json::RawGrammar = serde_json::from_slice(data)?;
    raw.try_into()
}

/// Parse a plist/XML grammar document.
pub fn from_plist(data: &[u8]) -> Result<Grammar, GrammarError> {
    let raw: json::RawGrammar = plist::from_bytes(data)?;
    raw.try_into()
}
