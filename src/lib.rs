//! Core library entry for the `labelflow` CLI.
//!
//! The core (normalized model, provider port, adapters, ticket service,
//! actionable filter, batch promotion) is usable as a library; the CLI
//! modules are thin glue over it.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod promotion;
pub mod provider;
pub mod service;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// Commands execute on a current-thread tokio runtime: all provider calls
/// are I/O-bound and sequential, so cooperative single-threaded scheduling
/// is all the concurrency this tool needs.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution
/// fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version are successful exits, not parse failures.
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to start async runtime: {err}"))?;
    runtime.block_on(commands::dispatch(&cli.command))
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["labelflow", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_subcommand() {
        let result = run(["labelflow"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_treats_help_as_success() {
        assert!(run(["labelflow", "--help"]).is_ok());
        assert!(run(["labelflow", "promote", "--help"]).is_ok());
    }

    #[test]
    fn run_treats_version_as_success() {
        assert!(run(["labelflow", "--version"]).is_ok());
    }
}
