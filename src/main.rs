use clap::Parser;
use regmove::cli::{Cli, run_cli};
use regmove::logging::init_logging;
use regmove::output::OutputFormatter;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = init_logging(cli.verbose, !cli.no_color && io::stderr().is_terminal()) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    match run_cli(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
