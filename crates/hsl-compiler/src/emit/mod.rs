//! Serialization: tables → binary container.
//!
//! The byte layout itself lives in `hsl-bytecode`; this stage decides the
//! header flags, guards the container's field widths, and handles file
//! output. Released file handles on every path come for free from `?` plus
//! RAII.

use std::path::Path;

use hsl_bytecode::{
    Program, FLAG_DETERMINISTIC, FLAG_LINEAR_TIME, FLAG_OPTIMIZED, FLAG_VALIDATED, REGEX_SIMPLE,
};

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("{0} table overflow: {1} entries")]
    TableOverflow(&'static str, usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialize a program. `optimized` records whether the optimizer ran.
pub fn emit(program: &Program, optimized: bool) -> Result<Vec<u8>, EmitError> {
    if program.string_table.len() > u32::MAX as usize {
        return Err(EmitError::TableOverflow("string", program.string_table.len()));
    }
    if program.rule_table.len() > u32::MAX as usize {
        return Err(EmitError::TableOverflow("rule", program.rule_table.len()));
    }

    let mut flags = FLAG_VALIDATED | FLAG_DETERMINISTIC;
    if optimized {
        flags |= FLAG_OPTIMIZED;
    }
    // Every guard DFA-compilable means the tokenizer can run in linear time.
    if program
        .regex_table
        .iter()
        .all(|r| r.flags & REGEX_SIMPLE != 0)
    {
        flags |= FLAG_LINEAR_TIME;
    }

    Ok(program.encode(flags))
}

/// Serialize and write to disk.
pub fn write_file(program: &Program, optimized: bool, path: &Path) -> Result<(), EmitError> {
    let bytes = emit(program, optimized)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
