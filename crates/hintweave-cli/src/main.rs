//! Entry point for the `hintweave` binary.
//!
//! All work happens in [`hintweave_cli::run`], which parses arguments, loads
//! configuration, installs telemetry and dispatches the command.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hintweave_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
