use std::fs;
use std::io::Write;

use hintweave_config::Config;
use hintweave_rules::ReportEntry;
use hintweave_syntax::Rewriter;

use super::Analyzer;
use crate::cli::ApplyArgs;
use crate::error::AppError;
use crate::sources;

pub(super) fn run<W: Write, E: Write>(
    args: &ApplyArgs,
    config: &Config,
    skip_bundled: bool,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<(), AppError> {
    let mut analyzer = Analyzer::new(config, skip_bundled)?;
    let sources = sources::collect(&args.paths);
    for error in &sources.errors {
        writeln!(stderr, "hintweave: {error}")?;
    }
    let headers = sources.files.len() > 1;

    let mut total = 0_usize;
    for path in &sources.files {
        let (tree, entries) = match analyzer.analyze(path) {
            Ok(analysis) => analysis,
            Err(error) => {
                writeln!(stderr, "hintweave: {error}")?;
                continue;
            }
        };
        let edits = entries.iter().filter_map(ReportEntry::to_edit).collect();
        let result = Rewriter::new().apply(tree.source(), edits)?;
        if result.skipped() > 0 {
            tracing::debug!(path = %path, skipped = result.skipped(), "dropped overlapping edits");
        }
        if result.num_replacements() == 0 {
            continue;
        }
        total = total.saturating_add(result.num_replacements());

        if args.write {
            fs::write(path, result.output()).map_err(|source| AppError::write_source(path, source))?;
            writeln!(stdout, "{path}: {} replacement(s)", result.num_replacements())?;
        } else {
            if headers {
                writeln!(stdout, "==> {path} <==")?;
            }
            write!(stdout, "{}", result.output())?;
        }
    }
    tracing::info!(files = sources.files.len(), replacements = total, "apply finished");
    Ok(())
}
