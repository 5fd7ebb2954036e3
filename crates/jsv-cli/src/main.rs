//! # jsv Binary Entry Point
//!
//! Exit codes: 0 — instance conforms; 1 — schema or instance does not
//! conform; 2 — usage, IO, or JSON-parse failure.

use std::process::ExitCode;

use clap::Parser;

use jsv_cli::{run, Cli, Outcome};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(Outcome::Valid) => ExitCode::SUCCESS,
        Ok(Outcome::Invalid) => ExitCode::from(1),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}
