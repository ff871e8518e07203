//! Bytecode file header (40 bytes).
//!
//! Layout:
//! - 0-3: magic `HSL1`
//! - 4-7: version (u16) and header size (u16)
//! - 8-27: five section offsets (u32), order: strings, regexes, scopes,
//!   states, rules
//! - 28-39: total size, checksum, flags (u32 each)

/// Magic bytes at offset 0.
pub const MAGIC: [u8; 4] = *b"HSL1";

/// Format version.
pub const VERSION: u16 = 1;

/// Fixed header size for this version.
pub const HEADER_SIZE: u16 = 40;

/// Byte range of the checksum field, zeroed while hashing.
pub(crate) const CHECKSUM_RANGE: std::ops::Range<usize> = 32..36;

/// File header - first 40 bytes of the bytecode file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub header_size: u16,
    pub string_table_offset: u32,
    pub regex_table_offset: u32,
    pub scope_table_offset: u32,
    pub state_table_offset: u32,
    pub rule_table_offset: u32,
    pub total_size: u32,
    /// CRC-32 (IEEE) of the file with this field zeroed.
    pub checksum: u32,
    pub flags: u32,
}

impl Header {
    pub fn new() -> Self {
        Self {
            version: VERSION,
            header_size: HEADER_SIZE,
            ..Default::default()
        }
    }

    /// Decode a header from the first 40 bytes. The caller checks the length.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE as usize, "header too short");

        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        Self {
            version: u16_at(4),
            header_size: u16_at(6),
            string_table_offset: u32_at(8),
            regex_table_offset: u32_at(12),
            scope_table_offset: u32_at(16),
            state_table_offset: u32_at(20),
            rule_table_offset: u32_at(24),
            total_size: u32_at(28),
            checksum: u32_at(32),
            flags: u32_at(36),
        }
    }

    /// Encode the header to its fixed 40-byte form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE as usize] {
        let mut bytes = [0u8; HEADER_SIZE as usize];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.header_size.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.string_table_offset.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.regex_table_offset.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.scope_table_offset.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.state_table_offset.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.rule_table_offset.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.flags.to_le_bytes());
        bytes
    }
}

/// Compute the file checksum: CRC-32 over `bytes` with the checksum field
/// treated as zero.
pub(crate) fn file_checksum(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bytes[..CHECKSUM_RANGE.start]);
    hasher.update(&[0u8; 4]);
    hasher.update(&bytes[CHECKSUM_RANGE.end..]);
    hasher.finalize()
}
