//! Binary entrypoint for the `labelflow` CLI.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Secrets (API keys, tokens) may live in a local .env during development.
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr so stdout stays parseable; off by default,
    // opt in with RUST_LOG=labelflow=debug.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match labelflow::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
