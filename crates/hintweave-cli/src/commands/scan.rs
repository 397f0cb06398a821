use std::io::Write;

use hintweave_config::{Config, ReportFormat};
use hintweave_rules::{ReportEntry, to_csv_by_file};
use serde::Serialize;

use super::Analyzer;
use crate::cli::ScanArgs;
use crate::error::AppError;
use crate::sources;

/// Entries found in one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    entries: Vec<ReportEntry>,
}

pub(super) fn run<W: Write, E: Write>(
    args: &ScanArgs,
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

    let mut reports = Vec::new();
    for path in &sources.files {
        match analyzer.analyze(path) {
            Ok((_, entries)) if entries.is_empty() => {}
            Ok((_, entries)) => reports.push(FileReport {
                file: path.to_string(),
                entries,
            }),
            Err(error) => writeln!(stderr, "hintweave: {error}")?,
        }
    }

    let findings: usize = reports.iter().map(|report| report.entries.len()).sum();
    tracing::info!(files = sources.files.len(), findings, "scan finished");
    render(config.report_format(), &reports, stdout)
}

fn render<W: Write>(format: ReportFormat, reports: &[FileReport], out: &mut W) -> Result<(), AppError> {
    match format {
        ReportFormat::Text => render_text(reports, out)?,
        ReportFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(reports)?)?,
        ReportFormat::Csv => {
            let files: Vec<(&str, Vec<ReportEntry>)> = reports
                .iter()
                .map(|report| (report.file.as_str(), report.entries.clone()))
                .collect();
            write!(out, "{}", to_csv_by_file(&files))?;
        }
    }
    Ok(())
}

fn render_text<W: Write>(reports: &[FileReport], out: &mut W) -> std::io::Result<()> {
    for report in reports {
        for entry in &report.entries {
            let message = entry.description.as_deref().unwrap_or(&entry.pattern);
            write!(
                out,
                "{}:{}:{}: {}: {message}: `{}`",
                report.file, entry.line, entry.column, entry.severity, entry.matched
            )?;
            match &entry.replacement {
                Some(replacement) => writeln!(out, " => `{replacement}`")?,
                None => writeln!(out)?,
            }
        }
    }
    let findings: usize = reports.iter().map(|report| report.entries.len()).sum();
    writeln!(out, "{findings} finding(s) in {} file(s)", reports.len())
}
