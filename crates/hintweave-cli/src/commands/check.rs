use std::fs;
use std::io::Write;

use hintweave_rules::{StoreError, parse_hint_file};

use crate::cli::CheckArgs;
use crate::error::AppError;

/// Parses every file, reporting rule counts on `stdout` and failures on
/// `stderr`. Fails when any file did not parse.
pub(super) fn run<W: Write, E: Write>(args: &CheckArgs, stdout: &mut W, stderr: &mut E) -> Result<(), AppError> {
    let mut failed = 0_usize;
    for path in &args.files {
        let parsed = fs::read_to_string(path)
            .map_err(|source| AppError::read_source(path, source))
            .and_then(|text| {
                parse_hint_file(&text)
                    .map_err(|source| AppError::from(StoreError::parse(path.as_str(), source)))
            });
        match parsed {
            Ok(file) => writeln!(stdout, "{path}: {} rule(s)", file.rules().len())?,
            Err(error) => {
                failed = failed.saturating_add(1);
                writeln!(stderr, "hintweave: {error}")?;
            }
        }
    }
    if failed == 0 {
        Ok(())
    } else {
        Err(AppError::Failures {
            failed,
            total: args.files.len(),
        })
    }
}
