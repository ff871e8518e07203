mod cli;
mod commands;
mod config;
mod tester;

use std::process::ExitCode;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = <Cli as clap::Parser>::parse();

    match cli.command {
        Command::Compile(args) => commands::compile::run(args),
        Command::Test(args) => commands::test::run(args),
        Command::Version => {
            println!("hslc v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
    }
}
