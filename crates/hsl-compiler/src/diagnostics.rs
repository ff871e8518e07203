//! Non-fatal findings collected while compiling.
//!
//! Hard failures are `Error` values; diagnostics carry everything the
//! compiler wants to tell the user without stopping (skipped rules in
//! non-strict mode, dropped captures). The CLI renders them to stderr.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Note,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Note => write!(f, "note: {}", self.message),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Note,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}
