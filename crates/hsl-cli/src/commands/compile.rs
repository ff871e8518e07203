use std::process::ExitCode;

use hsl_compiler::CompileOptions;

use crate::cli::CompileArgs;
use crate::config::LanguageConfig;

use super::CliError;

pub fn run(args: CompileArgs) -> ExitCode {
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn execute(args: &CompileArgs) -> Result<(), CliError> {
    let config = LanguageConfig::load(&args.config)?;
    for key in config.extra.keys() {
        eprintln!("warning: ignoring unknown config key `{key}`");
    }

    let compilation =
        hsl_compiler::compile_file(&config.grammar_path(), &CompileOptions::default())?;

    for diagnostic in compilation.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }

    if args.validate_only {
        println!("grammar validated successfully");
        return Ok(());
    }

    std::fs::write(&args.output, &compilation.bytes).map_err(|source| CliError::Write {
        path: args.output.clone(),
        source,
    })?;

    if args.verbose {
        println!(
            "{} v{} ({}): {} snippets, {} repository entries, {} metadata keys",
            config.name,
            config.version.as_deref().unwrap_or("0.0.0"),
            config.scope,
            config.snippets.len(),
            config.repository.len(),
            config.metadata.len(),
        );
        let stats = compilation.stats;
        println!(
            "compilation stats: {} regexes, {} states, {} rules, {} scopes, {} strings",
            stats.regexes, stats.states, stats.rules, stats.scopes, stats.strings
        );
    }
    println!("HSL bytecode written to {}", args.output.display());
    Ok(())
}
