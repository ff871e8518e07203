//! Regex table builder for the flattening stage.
//!
//! Entries deduplicate on exact pattern text and take dense ids in
//! insertion order; the lowerer walks the machine deterministically, so the
//! resulting table is a pure function of the machine.

use std::collections::HashMap;

use hsl_bytecode::{RegexEntry, REGEX_SIMPLE};
use hsl_core::StringPool;

/// Regex table keyed by exact pattern text. The v1 compiled payload is the
/// raw pattern; the flags field records whether a DFA encoding could replace
/// it.
#[derive(Debug, Default)]
pub(super) struct RegexTableBuilder {
    lookup: HashMap<String, u32>,
    entries: Vec<RegexEntry>,
}

impl RegexTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a pattern, also placing its text in the string table.
    pub fn intern(&mut self, pattern: &str, simple: bool, strings: &mut StringPool) -> u32 {
        if let Some(&id) = self.lookup.get(pattern) {
            return id;
        }
        strings.intern(pattern);

        let id = self.entries.len() as u32;
        self.entries.push(RegexEntry {
            id,
            pattern_hash: crc32fast::hash(pattern.as_bytes()),
            flags: if simple { REGEX_SIMPLE } else { 0 },
            compiled: pattern.as_bytes().to_vec(),
        });
        self.lookup.insert(pattern.to_owned(), id);
        id
    }

    pub fn finish(self) -> Vec<RegexEntry> {
        self.entries
    }
}
