//! Validating decoder for the bytecode container.
//!
//! `Module::from_bytes` checks magic, version, size and CRC before decoding
//! the tables, then verifies the cross-table index invariants. A module that
//! decodes successfully is safe to interpret without further bounds checks.

use crate::header::{self, Header, HEADER_SIZE, MAGIC, VERSION};
use crate::program::{
    CaptureMapping, Program, RegexEntry, RuleAction, RuleEntry, ScopeEntry, StateEntry,
};
use crate::SCOPE_NONE;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("bad magic bytes {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported bytecode version {0}")]
    UnsupportedVersion(u16),

    #[error("file is {actual} bytes but header total_size is {expected}")]
    SizeMismatch { expected: u32, actual: u32 },

    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("truncated {0} section")]
    Truncated(&'static str),

    #[error("string {0} is not valid UTF-8")]
    InvalidUtf8(u32),

    #[error("rule {rule} carries unknown action byte {action}")]
    UnknownAction { rule: u32, action: u8 },

    #[error("state {state} rule range {offset}+{count} exceeds rule table length {len}")]
    RuleRangeOutOfBounds {
        state: u32,
        offset: u32,
        count: u16,
        len: u32,
    },

    #[error("rule {rule} targets state {next} but the state table has {len} entries")]
    NextStateOutOfBounds { rule: u32, next: i32, len: u32 },

    #[error("rule {rule} references regex {regex} but the regex table has {len} entries")]
    RegexOutOfBounds { rule: u32, regex: u32, len: u32 },

    #[error("scope id {scope} exceeds scope table length {len}")]
    ScopeOutOfBounds { scope: u16, len: u32 },

    #[error("duplicate entry in {0} table")]
    DuplicateEntry(&'static str),
}

/// A decoded, validated bytecode file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub header: Header,
    pub program: Program,
}

impl Module {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_SIZE as usize {
            return Err(DecodeError::Truncated("header"));
        }

        let header = Header::from_bytes(bytes);

        // Integrity first: a single flipped byte anywhere outside the
        // checksum field must surface as a checksum failure.
        let computed = header::file_checksum(bytes);
        if computed != header.checksum {
            return Err(DecodeError::ChecksumMismatch {
                stored: header.checksum,
                computed,
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }
        if header.version != VERSION {
            return Err(DecodeError::UnsupportedVersion(header.version));
        }
        if header.total_size as usize != bytes.len() {
            return Err(DecodeError::SizeMismatch {
                expected: header.total_size,
                actual: bytes.len() as u32,
            });
        }

        let program = Program {
            string_table: decode_string_table(bytes, header.string_table_offset)?,
            regex_table: decode_regex_table(bytes, header.regex_table_offset)?,
            scope_table: decode_scope_table(bytes, header.scope_table_offset)?,
            state_table: decode_state_table(bytes, header.state_table_offset)?,
            rule_table: decode_rule_table(bytes, header.rule_table_offset)?,
        };

        let module = Self { header, program };
        module.validate()?;
        Ok(module)
    }

    /// Verify the cross-table index invariants.
    fn validate(&self) -> Result<(), DecodeError> {
        let p = &self.program;
        let states = p.state_table.len() as u32;
        let rules = p.rule_table.len() as u32;
        let scopes = p.scope_table.len() as u32;
        let regexes = p.regex_table.len() as u32;

        for state in &p.state_table {
            let end = state.rule_offset as u64 + state.rule_count as u64;
            if end > rules as u64 {
                return Err(DecodeError::RuleRangeOutOfBounds {
                    state: state.id,
                    offset: state.rule_offset,
                    count: state.rule_count,
                    len: rules,
                });
            }
        }

        let check_scope = |scope: u16| -> Result<(), DecodeError> {
            if scope != SCOPE_NONE && scope as u32 >= scopes {
                return Err(DecodeError::ScopeOutOfBounds { scope, len: scopes });
            }
            Ok(())
        };

        for (i, rule) in p.rule_table.iter().enumerate() {
            let rule_id = i as u32;
            if rule.next_state >= 0 && rule.next_state as u32 >= states {
                return Err(DecodeError::NextStateOutOfBounds {
                    rule: rule_id,
                    next: rule.next_state,
                    len: states,
                });
            }
            if rule.regex_id >= regexes {
                return Err(DecodeError::RegexOutOfBounds {
                    rule: rule_id,
                    regex: rule.regex_id,
                    len: regexes,
                });
            }
            check_scope(rule.scope_id)?;
            for cap in &rule.captures {
                check_scope(cap.scope)?;
            }
        }

        for scope in &p.scope_table {
            if scope.name_index as usize >= p.string_table.len() {
                return Err(DecodeError::Truncated("scope name"));
            }
            check_scope(scope.parent)?;
        }

        // String and scope tables are duplicate-free by construction; reject
        // files that claim otherwise.
        if has_duplicates(p.string_table.iter()) {
            return Err(DecodeError::DuplicateEntry("string"));
        }
        if has_duplicates(p.scope_table.iter().map(|s| s.name_index)) {
            return Err(DecodeError::DuplicateEntry("scope"));
        }

        Ok(())
    }
}

fn has_duplicates<T: Ord>(items: impl Iterator<Item = T>) -> bool {
    let mut seen = std::collections::BTreeSet::new();
    for item in items {
        if !seen.insert(item) {
            return true;
        }
    }
    false
}

/// Bounds-checked little-endian reader over one section.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    section: &'static str,
}

impl<'a> Reader<'a> {
    fn at(bytes: &'a [u8], offset: u32, section: &'static str) -> Result<Self, DecodeError> {
        if offset as usize > bytes.len() {
            return Err(DecodeError::Truncated(section));
        }
        Ok(Self {
            bytes,
            pos: offset as usize,
            section,
        })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.pos + n > self.bytes.len() {
            return Err(DecodeError::Truncated(self.section));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

fn decode_string_table(bytes: &[u8], offset: u32) -> Result<Vec<String>, DecodeError> {
    let mut r = Reader::at(bytes, offset, "string")?;
    let count = r.u32()? as usize;

    let mut offsets = Vec::with_capacity(count + 1);
    for _ in 0..=count {
        offsets.push(r.u32()? as usize);
    }
    let data = r.take(*offsets.last().unwrap_or(&0))?;

    let mut strings = Vec::with_capacity(count);
    for i in 0..count {
        let (start, end) = (offsets[i], offsets[i + 1]);
        if end < start + 1 || end > data.len() {
            return Err(DecodeError::Truncated("string"));
        }
        // Drop the trailing NUL.
        let s = std::str::from_utf8(&data[start..end - 1])
            .map_err(|_| DecodeError::InvalidUtf8(i as u32))?;
        strings.push(s.to_owned());
    }
    Ok(strings)
}

fn decode_regex_table(bytes: &[u8], offset: u32) -> Result<Vec<RegexEntry>, DecodeError> {
    let mut r = Reader::at(bytes, offset, "regex")?;
    let count = r.u32()?;

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id = r.u32()?;
        let pattern_hash = r.u32()?;
        let flags = r.u32()?;
        let len = r.u32()? as usize;
        let compiled = r.take(len)?.to_vec();
        entries.push(RegexEntry {
            id,
            pattern_hash,
            flags,
            compiled,
        });
    }
    Ok(entries)
}

fn decode_scope_table(bytes: &[u8], offset: u32) -> Result<Vec<ScopeEntry>, DecodeError> {
    let mut r = Reader::at(bytes, offset, "scope")?;
    let count = r.u32()?;

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id = r.u16()?;
        let parent = r.u16()?;
        let name_index = r.u32()?;
        entries.push(ScopeEntry {
            id,
            name_index,
            parent,
        });
    }
    Ok(entries)
}

fn decode_state_table(bytes: &[u8], offset: u32) -> Result<Vec<StateEntry>, DecodeError> {
    let mut r = Reader::at(bytes, offset, "state")?;
    let count = r.u32()?;

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id = r.u32()?;
        let rule_offset = r.u32()?;
        let rule_count = r.u16()?;
        let flags = r.u8()?;
        let _pad = r.u8()?;
        entries.push(StateEntry {
            id,
            rule_offset,
            rule_count,
            flags,
        });
    }
    Ok(entries)
}

fn decode_rule_table(bytes: &[u8], offset: u32) -> Result<Vec<RuleEntry>, DecodeError> {
    let mut r = Reader::at(bytes, offset, "rule")?;
    let count = r.u32()?;

    let mut entries = Vec::with_capacity(count as usize);
    for i in 0..count {
        let regex_id = r.u32()?;
        let next_state = r.i32()?;
        let scope_id = r.u16()?;
        let action_byte = r.u8()?;
        let action = RuleAction::from_byte(action_byte).ok_or(DecodeError::UnknownAction {
            rule: i,
            action: action_byte,
        })?;
        let priority = r.u8()?;
        let capture_count = r.u8()?;

        let mut captures = Vec::with_capacity(capture_count as usize);
        for _ in 0..capture_count {
            let group = r.u8()?;
            let scope = r.u16()?;
            captures.push(CaptureMapping { group, scope });
        }
        entries.push(RuleEntry {
            regex_id,
            action,
            next_state,
            scope_id,
            priority,
            captures,
        });
    }
    Ok(entries)
}
