//! Command-line runtime for hintweave.
//!
//! [`run`] parses arguments, loads configuration from the `--config-path`
//! file, `HINTWEAVE_*` variables and flags, installs telemetry and runs one of the
//! `scan`, `apply`, `check` or `list` commands. Output goes to the writers
//! the caller passes in, so tests can capture it.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use hintweave_config::Config;
use ortho_config::OrthoConfig;

mod cli;
mod commands;
mod error;
mod rules;
mod sources;
pub mod telemetry;

use cli::Cli;
pub use error::AppError;

/// Exit status for invalid usage.
const USAGE_EXIT: u8 = 2;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    match execute(&cli, stdout, stderr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "hintweave: {error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write, E: Write>(cli: &Cli, stdout: &mut W, stderr: &mut E) -> Result<(), AppError> {
    let config =
        Config::load_from_iter(cli.config_arguments()).map_err(AppError::LoadConfiguration)?;
    telemetry::initialise(&config)?;
    tracing::debug!(?config, "configuration loaded");
    commands::dispatch(cli, &config, stdout, stderr)
}

fn report_usage<W: Write, E: Write>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode {
    let rendered = error.render();
    if error.use_stderr() {
        let _ = write!(stderr, "{rendered}");
        ExitCode::from(USAGE_EXIT)
    } else {
        let _ = write!(stdout, "{rendered}");
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests;
