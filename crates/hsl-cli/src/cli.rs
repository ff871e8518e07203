use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hslc", bin_name = "hslc")]
#[command(about = "Compiles TextMate grammars to HSL bytecode")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a TextMate grammar to HSL bytecode
    #[command(after_help = r#"EXAMPLES:
  hslc compile language.toml                # writes output.hsl
  hslc compile language.toml -o rust.hsl
  hslc compile language.toml -v             # validate only"#)]
    Compile(CompileArgs),

    /// Run tokenization tests from TOML specs
    #[command(after_help = r#"EXAMPLES:
  hslc test language.toml                   # specs from specs/
  hslc test language.toml -s tests/specs"#)]
    Test(TestArgs),

    /// Show the compiler version
    Version,
}

#[derive(Args)]
pub struct CompileArgs {
    /// Path to language.toml
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output bytecode file
    #[arg(short = 'o', long, default_value = "output.hsl", value_name = "FILE")]
    pub output: PathBuf,

    /// Only validate, do not write bytecode
    #[arg(short = 'v', long)]
    pub validate_only: bool,

    /// Print compilation statistics
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct TestArgs {
    /// Path to language.toml
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Directory with TOML test specs
    #[arg(short = 's', long, default_value = "specs", value_name = "DIR")]
    pub spec_dir: PathBuf,
}
