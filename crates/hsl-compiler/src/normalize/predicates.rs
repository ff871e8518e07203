//! Pattern classification: regex text → structured guard.
//!
//! Patterns a strict regex parser accepts are lowered to the most specific
//! predicate shape available (char, literal, set, class, any). Patterns it
//! rejects are inspected for Oniguruma extensions: those ride along as
//! complex regexes; anything else is a genuine syntax error.

use regex_syntax::hir::{Class, Hir, HirKind};

use crate::ir::{CharClass, Predicate};

use super::NormalizeError;

/// Character-set predicates keep at most this many ranges structured;
/// anything larger (unicode classes and the like) stays a regex.
const MAX_SET_RANGES: usize = 16;

pub(super) fn build(pattern: &str) -> Result<Predicate, NormalizeError> {
    if pattern.is_empty() {
        return Err(NormalizeError::InvalidRegex {
            pattern: String::new(),
            reason: "empty pattern".to_owned(),
        });
    }

    // Shorthand classes keep their tag even though the parser would accept
    // them; the tokenizer switches on it directly.
    match pattern {
        "." => return Ok(Predicate::Any),
        r"\w" => return Ok(Predicate::CharClass(CharClass::Word)),
        r"\d" => return Ok(Predicate::CharClass(CharClass::Digit)),
        r"\s" => return Ok(Predicate::CharClass(CharClass::Space)),
        _ => {}
    }

    if let Some(predicate) = whole_pattern_lookahead(pattern) {
        return Ok(predicate);
    }

    match regex_syntax::Parser::new().parse(pattern) {
        Ok(hir) => Ok(classify(pattern, &hir)),
        Err(err) => {
            if has_oniguruma_extensions(pattern) {
                Ok(Predicate::Regex {
                    pattern: pattern.to_owned(),
                    simple: false,
                })
            } else {
                Err(NormalizeError::InvalidRegex {
                    pattern: pattern.to_owned(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

fn classify(pattern: &str, hir: &Hir) -> Predicate {
    match hir.kind() {
        HirKind::Literal(lit) => match std::str::from_utf8(&lit.0) {
            Ok(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Predicate::Char(c),
                    _ => Predicate::Literal(text.to_owned()),
                }
            }
            Err(_) => simple_regex(pattern),
        },
        HirKind::Class(Class::Unicode(class)) => {
            let ranges: Vec<(char, char)> = class
                .ranges()
                .iter()
                .map(|r| (r.start(), r.end()))
                .collect();
            if ranges.len() > MAX_SET_RANGES {
                return simple_regex(pattern);
            }
            let (chars, ranges) = ranges
                .into_iter()
                .partition::<Vec<_>, _>(|(lo, hi)| lo == hi);
            Predicate::CharSet {
                chars: chars.into_iter().map(|(c, _)| c).collect(),
                ranges,
                negated: false,
            }
        }
        _ => simple_regex(pattern),
    }
}

fn simple_regex(pattern: &str) -> Predicate {
    Predicate::Regex {
        pattern: pattern.to_owned(),
        simple: true,
    }
}

/// Recognize a pattern that is exactly one lookahead group, e.g. `(?=foo)`.
fn whole_pattern_lookahead(pattern: &str) -> Option<Predicate> {
    let positive = if pattern.starts_with("(?=") {
        true
    } else if pattern.starts_with("(?!") {
        false
    } else {
        return None;
    };

    if pattern.len() < 5 || !pattern.ends_with(')') || !parens_balance_at_end(pattern) {
        return None;
    }
    let inner = &pattern[3..pattern.len() - 1];

    // A malformed inner pattern degrades to a complex regex rather than
    // failing the whole rule.
    let inner_predicate = build(inner).ok()?;
    Some(Predicate::Lookahead {
        positive,
        inner: Box::new(inner_predicate),
    })
}

/// True when the group opened at position 0 closes exactly at the final
/// character.
fn parens_balance_at_end(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i == bytes.len() - 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    false
}

/// Constructs the strict parser rejects but Oniguruma accepts.
fn has_oniguruma_extensions(pattern: &str) -> bool {
    const MARKERS: &[&str] = &[
        "(?=", "(?!", "(?<=", "(?<!", "(?>", r"\G", r"\h", r"\H", r"\K",
    ];
    MARKERS.iter().any(|m| pattern.contains(m))
        || contains_possessive_quantifier(pattern)
}

fn contains_possessive_quantifier(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if matches!(bytes[i], b'*' | b'+' | b'?') && bytes[i + 1] == b'+' {
            return true;
        }
        i += 1;
    }
    false
}
