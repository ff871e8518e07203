//! Transition guards.
//!
//! A tagged union over the guard shapes the tokenizer can evaluate. Simple
//! shapes (chars, sets, literals) are kept structured so the optimizer can
//! reason about them; everything else rides along as a regex with its
//! original pattern text.

use std::fmt;

/// The three shorthand character classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CharClass {
    /// `\w`
    Word,
    /// `\d`
    Digit,
    /// `\s`
    Space,
}

impl CharClass {
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Word => r"\w",
            Self::Digit => r"\d",
            Self::Space => r"\s",
        }
    }
}

/// A transition guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// A single literal character.
    Char(char),
    /// A character set with optional negation and ranges.
    CharSet {
        chars: Vec<char>,
        ranges: Vec<(char, char)>,
        negated: bool,
    },
    CharClass(CharClass),
    /// A literal string.
    Literal(String),
    /// A general regular expression. `simple` means the pattern is accepted
    /// by a strict regex parser (no Oniguruma extensions) and is eligible
    /// for DFA compilation.
    Regex { pattern: String, simple: bool },
    /// Any single character.
    Any,
    /// End of input.
    EndOfInput,
    /// Positive or negative lookahead around another predicate.
    Lookahead {
        positive: bool,
        inner: Box<Predicate>,
    },
    /// Conjunction: all predicates hold at the same position.
    All(Vec<Predicate>),
    /// Disjunction: at least one predicate holds.
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    /// Whether firing on this guard consumes input.
    pub fn consumes_input(&self) -> bool {
        !matches!(self, Self::EndOfInput | Self::Lookahead { .. })
    }

    /// Whether any input can satisfy this guard.
    pub fn is_satisfiable(&self) -> bool {
        match self {
            Self::CharSet {
                chars,
                ranges,
                negated,
            } => *negated || !chars.is_empty() || !ranges.is_empty(),
            Self::All(preds) => preds.iter().all(Predicate::is_satisfiable),
            Self::AnyOf(preds) => preds.iter().any(Predicate::is_satisfiable),
            Self::Lookahead { inner, positive } => !positive || inner.is_satisfiable(),
            _ => true,
        }
    }

    /// Whether the guard's pattern form is accepted by a strict regex parser
    /// and therefore DFA-compilable.
    pub fn is_simple(&self) -> bool {
        match self {
            Self::Regex { simple, .. } => *simple,
            Self::Lookahead { .. } => false,
            Self::All(_) => false, // encoded with lookaheads
            Self::AnyOf(preds) => preds.iter().all(Predicate::is_simple),
            _ => true,
        }
    }

    /// Canonical textual form, used for equivalence signatures and
    /// transition deduplication. Deterministic by construction.
    pub fn canonical_form(&self) -> String {
        self.to_string()
    }

    /// Regex pattern text equivalent to this guard, suitable for the regex
    /// table. For `Regex` guards this is the original pattern.
    pub fn to_pattern(&self) -> String {
        match self {
            Self::Char(c) => regex_syntax::escape(&c.to_string()),
            Self::CharSet {
                chars,
                ranges,
                negated,
            } => {
                let mut out = String::from("[");
                if *negated {
                    out.push('^');
                }
                for c in chars {
                    push_set_char(&mut out, *c);
                }
                for (lo, hi) in ranges {
                    push_set_char(&mut out, *lo);
                    out.push('-');
                    push_set_char(&mut out, *hi);
                }
                out.push(']');
                out
            }
            Self::CharClass(class) => class.pattern().to_owned(),
            Self::Literal(s) => regex_syntax::escape(s),
            Self::Regex { pattern, .. } => pattern.clone(),
            Self::Any => ".".to_owned(),
            Self::EndOfInput => r"\z".to_owned(),
            Self::Lookahead { positive, inner } => {
                let op = if *positive { "=" } else { "!" };
                format!("(?{op}{})", inner.to_pattern())
            }
            Self::All(preds) => {
                // All but the last become lookaheads anchored at the same
                // position; the last one consumes.
                let mut out = String::new();
                for p in preds.iter().take(preds.len().saturating_sub(1)) {
                    out.push_str(&format!("(?={})", p.to_pattern()));
                }
                if let Some(last) = preds.last() {
                    out.push_str(&last.to_pattern());
                }
                out
            }
            Self::AnyOf(preds) => {
                let alts: Vec<String> = preds.iter().map(Predicate::to_pattern).collect();
                format!("(?:{})", alts.join("|"))
            }
        }
    }

    /// Merge two guards into one when their union has a direct
    /// representation. Used by the simplify pass on neighboring transitions.
    pub fn try_union(&self, other: &Predicate) -> Option<Predicate> {
        use Predicate::*;

        let as_set = |p: &Predicate| -> Option<(Vec<char>, Vec<(char, char)>)> {
            match p {
                Char(c) => Some((vec![*c], Vec::new())),
                CharSet {
                    chars,
                    ranges,
                    negated: false,
                } => Some((chars.clone(), ranges.clone())),
                _ => None,
            }
        };

        if let (Some((mut chars, mut ranges)), Some((c2, r2))) = (as_set(self), as_set(other)) {
            chars.extend(c2);
            ranges.extend(r2);
            chars.sort_unstable();
            chars.dedup();
            ranges.sort_unstable();
            ranges.dedup();
            return Some(CharSet {
                chars,
                ranges,
                negated: false,
            });
        }

        if let (Literal(a), Literal(b)) = (self, other) {
            return Some(AnyOf(vec![Literal(a.clone()), Literal(b.clone())]));
        }

        None
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "char({c:?})"),
            Self::CharSet {
                chars,
                ranges,
                negated,
            } => {
                write!(f, "set{}[", if *negated { "^" } else { "" })?;
                for c in chars {
                    write!(f, "{c}")?;
                }
                for (lo, hi) in ranges {
                    write!(f, "{lo}-{hi}")?;
                }
                write!(f, "]")
            }
            Self::CharClass(CharClass::Word) => write!(f, "class:w"),
            Self::CharClass(CharClass::Digit) => write!(f, "class:d"),
            Self::CharClass(CharClass::Space) => write!(f, "class:s"),
            Self::Literal(s) => write!(f, "lit({s:?})"),
            Self::Regex { pattern, .. } => write!(f, "regex:{pattern}"),
            Self::Any => write!(f, "any"),
            Self::EndOfInput => write!(f, "eof"),
            Self::Lookahead { positive, inner } => {
                write!(f, "la{}({inner})", if *positive { "+" } else { "-" })
            }
            Self::All(preds) => {
                write!(f, "and(")?;
                for (i, p) in preds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")
            }
            Self::AnyOf(preds) => {
                write!(f, "or(")?;
                for (i, p) in preds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Escape a character for use inside a `[...]` set.
fn push_set_char(out: &mut String, c: char) {
    if matches!(c, ']' | '\\' | '^' | '-') {
        out.push('\\');
    }
    out.push(c);
}
