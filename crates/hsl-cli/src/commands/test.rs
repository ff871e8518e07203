use std::process::ExitCode;

use hsl_bytecode::Module;
use hsl_compiler::CompileOptions;

use crate::cli::TestArgs;
use crate::config::LanguageConfig;
use crate::tester::{self, TestReport};

use super::CliError;

pub fn run(args: TestArgs) -> ExitCode {
    match execute(&args) {
        Ok(report) => {
            println!(
                "test results: {}/{} passed, {} failed",
                report.passed, report.total, report.failed
            );
            for failure in &report.failures {
                eprintln!("{failure}");
            }
            if report.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn execute(args: &TestArgs) -> Result<TestReport, CliError> {
    let config = LanguageConfig::load(&args.config)?;
    let compilation =
        hsl_compiler::compile_file(&config.grammar_path(), &CompileOptions::default())?;

    // Reload through the decoder so the tests exercise exactly what a
    // downstream tokenizer would see.
    let module = Module::from_bytes(&compilation.bytes)?;

    let specs = tester::load_specs(&args.spec_dir)?;
    Ok(tester::run_specs(&module, &specs)?)
}
