//! kvenv - export Azure Key Vault secrets to a .env file.

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kvenv::cli::output;
use kvenv::cli::{execute, Cli};
use kvenv::error::Error;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("KVENV_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kvenv=debug")
        } else {
            EnvFilter::new("kvenv=info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(&cli) {
        output::error(&e.to_string());
        if matches!(e, Error::Usage(_)) {
            eprintln!("{}", Cli::command().render_usage());
        }
        if let Some(hint) = e.hint() {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
