use std::io::Write;

use hintweave_config::Config;

use crate::error::AppError;
use crate::rules::load_store;

/// Prints each registered hint file with its own and resolved rule counts.
pub(super) fn run<W: Write>(
    config: &Config,
    skip_bundled: bool,
    stdout: &mut W,
) -> Result<(), AppError> {
    let store = load_store(config, skip_bundled)?;
    for key in store.registered_ids() {
        let Some(file) = store.get(&key) else {
            continue;
        };
        let resolved = store.resolve_includes(&file).len();
        write!(stdout, "{key}: {} rule(s), {resolved} with includes", file.rules().len())?;
        match file.description() {
            Some(description) => writeln!(stdout, " ({description})")?,
            None => writeln!(stdout)?,
        }
    }
    Ok(())
}
