//! The flat program: five dense tables linked by integer indices.
//!
//! This is the last in-memory form before serialization and the first after
//! deserialization. Encoding is deterministic: the byte output is a pure
//! function of the table contents and the header flags.

use crate::header::{self, Header, HEADER_SIZE};
use crate::{SECTION_ALIGN, SCOPE_NONE};

/// One compiled regular expression.
///
/// In format version 1 the compiled payload is the raw pattern text; the
/// `flags` field distinguishes encoding variants so a DFA payload can be
/// introduced later without an ABI change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexEntry {
    pub id: u32,
    /// CRC-32 of the pattern text.
    pub pattern_hash: u32,
    pub flags: u32,
    /// Opaque compiled payload (the pattern bytes in v1).
    pub compiled: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeEntry {
    pub id: u16,
    /// Index into the string table.
    pub name_index: u32,
    /// Parent scope id, or `SCOPE_NONE`.
    pub parent: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateEntry {
    pub id: u32,
    /// First rule belonging to this state.
    pub rule_offset: u32,
    pub rule_count: u16,
    /// `STATE_FINAL` | `STATE_PUSH` | `STATE_POP`.
    pub flags: u8,
}

/// What firing a rule does to the tokenizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RuleAction {
    /// Emit a token and stay.
    Match = 0,
    /// Enter a region: push the scope and the state stack.
    PushScope = 1,
    /// Leave a region: pop the scope and the state stack.
    PopScope = 2,
    /// Move to another state without a stack effect.
    Transition = 3,
}

impl RuleAction {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Match),
            1 => Some(Self::PushScope),
            2 => Some(Self::PopScope),
            3 => Some(Self::Transition),
            _ => None,
        }
    }
}

/// A numbered capture group mapped to a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureMapping {
    pub group: u8,
    pub scope: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleEntry {
    pub regex_id: u32,
    pub action: RuleAction,
    /// `>= 0`: target state id; `NEXT_STATE_POP`; `NEXT_STATE_STAY`.
    pub next_state: i32,
    /// Scope attached to the rule, or `SCOPE_NONE`.
    pub scope_id: u16,
    pub priority: u8,
    pub captures: Vec<CaptureMapping>,
}

/// The complete flat program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Interned byte strings; index 0 is the empty string.
    pub string_table: Vec<String>,
    pub regex_table: Vec<RegexEntry>,
    pub scope_table: Vec<ScopeEntry>,
    pub state_table: Vec<StateEntry>,
    pub rule_table: Vec<RuleEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramStats {
    pub strings: usize,
    pub regexes: usize,
    pub scopes: usize,
    pub states: usize,
    pub rules: usize,
}

impl Program {
    pub fn stats(&self) -> ProgramStats {
        ProgramStats {
            strings: self.string_table.len(),
            regexes: self.regex_table.len(),
            scopes: self.scope_table.len(),
            states: self.state_table.len(),
            rules: self.rule_table.len(),
        }
    }

    /// Resolve a scope entry's name.
    pub fn scope_name(&self, scope_id: u16) -> Option<&str> {
        if scope_id == SCOPE_NONE {
            return None;
        }
        let entry = self.scope_table.get(scope_id as usize)?;
        self.string_table
            .get(entry.name_index as usize)
            .map(|s| s.as_str())
    }

    /// Serialize to the binary container.
    ///
    /// Section order: strings, regexes, scopes, states, rules, each aligned
    /// to `SECTION_ALIGN`. The header is written last, once all offsets and
    /// the checksum are known.
    pub fn encode(&self, flags: u32) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE as usize];
        let mut header = Header::new();
        header.flags = flags;

        header.string_table_offset = begin_section(&mut buf);
        self.encode_string_table(&mut buf);

        header.regex_table_offset = begin_section(&mut buf);
        self.encode_regex_table(&mut buf);

        header.scope_table_offset = begin_section(&mut buf);
        self.encode_scope_table(&mut buf);

        header.state_table_offset = begin_section(&mut buf);
        self.encode_state_table(&mut buf);

        header.rule_table_offset = begin_section(&mut buf);
        self.encode_rule_table(&mut buf);

        header.total_size = buf.len() as u32;
        buf[..HEADER_SIZE as usize].copy_from_slice(&header.to_bytes());

        let checksum = header::file_checksum(&buf);
        buf[header::CHECKSUM_RANGE].copy_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Strings: count, count+1 offsets (last is the data size), then the
    /// data blob. Every string is stored with a trailing NUL.
    fn encode_string_table(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.string_table.len() as u32).to_le_bytes());

        let mut data = Vec::new();
        for s in &self.string_table {
            buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            data.extend_from_slice(s.as_bytes());
            data.push(0);
        }
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&data);
    }

    fn encode_regex_table(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.regex_table.len() as u32).to_le_bytes());
        for entry in &self.regex_table {
            buf.extend_from_slice(&entry.id.to_le_bytes());
            buf.extend_from_slice(&entry.pattern_hash.to_le_bytes());
            buf.extend_from_slice(&entry.flags.to_le_bytes());
            buf.extend_from_slice(&(entry.compiled.len() as u32).to_le_bytes());
            buf.extend_from_slice(&entry.compiled);
        }
    }

    fn encode_scope_table(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.scope_table.len() as u32).to_le_bytes());
        for entry in &self.scope_table {
            buf.extend_from_slice(&entry.id.to_le_bytes());
            buf.extend_from_slice(&entry.parent.to_le_bytes());
            buf.extend_from_slice(&entry.name_index.to_le_bytes());
        }
    }

    fn encode_state_table(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.state_table.len() as u32).to_le_bytes());
        for entry in &self.state_table {
            buf.extend_from_slice(&entry.id.to_le_bytes());
            buf.extend_from_slice(&entry.rule_offset.to_le_bytes());
            buf.extend_from_slice(&entry.rule_count.to_le_bytes());
            buf.push(entry.flags);
            buf.push(0); // pad
        }
    }

    fn encode_rule_table(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.rule_table.len() as u32).to_le_bytes());
        for entry in &self.rule_table {
            buf.extend_from_slice(&entry.regex_id.to_le_bytes());
            buf.extend_from_slice(&entry.next_state.to_le_bytes());
            buf.extend_from_slice(&entry.scope_id.to_le_bytes());
            buf.push(entry.action as u8);
            buf.push(entry.priority);
            buf.push(entry.captures.len() as u8);
            for cap in &entry.captures {
                buf.push(cap.group);
                buf.extend_from_slice(&cap.scope.to_le_bytes());
            }
        }
    }
}

/// Pad to the section alignment and return the section's file offset.
fn begin_section(buf: &mut Vec<u8>) -> u32 {
    let rem = buf.len() % SECTION_ALIGN;
    if rem != 0 {
        buf.resize(buf.len() + SECTION_ALIGN - rem, 0);
    }
    buf.len() as u32
}
