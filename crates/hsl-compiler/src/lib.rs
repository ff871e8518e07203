//! HSL compiler: turns TextMate-style grammars into HSL bytecode.
//!
//! The pipeline is a synchronous sequence of stages, each owning its output:
//! - `grammar` - loads JSON (or plist) documents into the grammar tree
//! - `normalize` - expands includes and lowers rules to a state machine
//! - `optimize` - structural passes that shrink the machine
//! - `lower` - flattens the machine into dense tables with interned ids
//! - `emit` - serializes the tables into the binary container
//!
//! Errors bubble up unchanged; no stage catches and proceeds.

pub mod diagnostics;
pub mod emit;
pub mod grammar;
pub mod ir;
pub mod lower;
pub mod normalize;
pub mod optimize;


pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use grammar::{Grammar, GrammarError};
pub use normalize::{FeaturePolicy, NormalizeError};
pub use optimize::OptimizeError;
pub use emit::EmitError;

use hsl_bytecode::ProgramStats;

/// Any error the compilation pipeline can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl Error {
    /// Whether the failure is an I/O problem rather than a compile problem.
    /// Callers use this to pick an exit code.
    pub fn is_io(&self) -> bool {
        match self {
            Self::Grammar(GrammarError::Io { .. }) => true,
            Self::Emit(EmitError::Io(_)) => true,
            _ => false,
        }
    }
}

/// Knobs for a single compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub policy: FeaturePolicy,
    /// Skip the optimizer when false (the output stays semantically
    /// equivalent, only larger).
    pub no_optimize: bool,
}

/// The result of a successful compilation.
#[derive(Debug)]
pub struct Compilation {
    pub bytes: Vec<u8>,
    pub stats: ProgramStats,
    pub diagnostics: Diagnostics,
}

/// Run the full pipeline on a loaded grammar.
pub fn compile(grammar: &Grammar, options: &CompileOptions) -> Result<Compilation, Error> {
    let (mut machine, diagnostics) = normalize::normalize(grammar, &options.policy)?;

    if !options.no_optimize {
        optimize::optimize(&mut machine)?;
    }

    let program = lower::lower(&machine)?;
    let bytes = emit::emit(&program, !options.no_optimize)?;

    Ok(Compilation {
        stats: program.stats(),
        bytes,
        diagnostics,
    })
}

/// Load a grammar file and compile it with the given options.
pub fn compile_file(
    path: &std::path::Path,
    options: &CompileOptions,
) -> Result<Compilation, Error> {
    let grammar = grammar::load_grammar(path)?;
    compile(&grammar, options)
}
