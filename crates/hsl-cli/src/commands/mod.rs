//! Subcommand implementations.
//!
//! Exit codes follow the error kind: 0 on success, 1 on compile or test
//! failure, 2 on I/O problems.

pub mod compile;
pub mod test;

use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::ConfigError;
use crate::tester::TesterError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] hsl_compiler::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to reload compiled bytecode: {0}")]
    Reload(#[from] hsl_bytecode::DecodeError),

    #[error(transparent)]
    Tester(#[from] TesterError),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        let io = match self {
            Self::Config(err) => err.is_io(),
            Self::Compile(err) => err.is_io(),
            Self::Write { .. } => true,
            Self::Reload(_) => false,
            Self::Tester(err) => matches!(err, TesterError::Io { .. }),
        };
        if io {
            ExitCode::from(2)
        } else {
            ExitCode::from(1)
        }
    }
}
