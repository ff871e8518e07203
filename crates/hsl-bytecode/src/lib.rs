//! Stable binary format for compiled HSL grammars.
//!
//! File layout: a fixed 40-byte header followed by five sections in the
//! order strings, regexes, scopes, states, rules. Every section starts on an
//! 8-byte boundary with a `u32` entry count. All integers are little-endian.
//!
//! The format is versioned by `MAGIC` + `VERSION` and integrity-checked with
//! a CRC-32 (IEEE) computed over the whole file with the header checksum
//! field zeroed.

mod header;
mod module;
mod program;


pub use header::{Header, HEADER_SIZE, MAGIC, VERSION};
pub use module::{DecodeError, Module};
pub use program::{
    CaptureMapping, Program, ProgramStats, RegexEntry, RuleAction, RuleEntry, ScopeEntry,
    StateEntry,
};

/// Sections are aligned to this boundary within the file.
pub const SECTION_ALIGN: usize = 8;

/// Header flag bits.
pub const FLAG_VALIDATED: u32 = 1;
pub const FLAG_OPTIMIZED: u32 = 2;
pub const FLAG_DETERMINISTIC: u32 = 4;
pub const FLAG_LINEAR_TIME: u32 = 8;

/// State flag bits.
pub const STATE_FINAL: u8 = 1;
pub const STATE_PUSH: u8 = 2;
pub const STATE_POP: u8 = 4;

/// Regex entry flag bits. `SIMPLE` marks patterns accepted by a strict regex
/// parser and therefore eligible for DFA compilation in a future version.
pub const REGEX_SIMPLE: u32 = 1;

/// Sentinel for "no scope" / "no parent" in `u16` scope id fields.
pub const SCOPE_NONE: u16 = 0xFFFF;

/// `next_state` sentinel: pop the state stack.
pub const NEXT_STATE_POP: i32 = -1;
/// `next_state` sentinel: stay in the current state.
pub const NEXT_STATE_STAY: i32 = -2;
