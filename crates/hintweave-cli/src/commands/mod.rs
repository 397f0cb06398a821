//! Command implementations.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use camino::Utf8Path;
use hintweave_config::Config;
use hintweave_rules::{DryRunReporter, ReportEntry, ReportOptions};
use hintweave_syntax::{DeclaredTypeResolver, Parser, SupportedLanguage, SyntaxTree};

use crate::cli::{Cli, Command};
use crate::error::AppError;
use crate::rules::{SeverityGroup, load_store, severity_groups};

mod apply;
mod check;
mod list;
mod scan;

/// Runs the command `cli` names with `config`.
pub(crate) fn dispatch<W: Write, E: Write>(
    cli: &Cli,
    config: &Config,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<(), AppError> {
    let skip_bundled = cli.skips_bundled();
    match &cli.command {
        Command::Scan(args) => scan::run(args, config, skip_bundled, stdout, stderr),
        Command::Apply(args) => apply::run(args, config, skip_bundled, stdout, stderr),
        Command::Check(args) => check::run(args, stdout, stderr),
        Command::List(_) => list::run(config, skip_bundled, stdout),
    }
}

/// Parses Java files and reports what the configured rules find in them.
pub(crate) struct Analyzer {
    parser: Parser,
    reporter: DryRunReporter,
    groups: Vec<SeverityGroup>,
    source_version: Option<String>,
}

impl Analyzer {
    pub(crate) fn new(config: &Config, skip_bundled: bool) -> Result<Self, AppError> {
        let store = load_store(config, skip_bundled)?;
        let groups = severity_groups(&store);
        tracing::debug!(
            files = store.len(),
            rules = groups.iter().map(|(_, rules)| rules.len()).sum::<usize>(),
            "rules loaded"
        );
        Ok(Self {
            parser: Parser::new(SupportedLanguage::Java)?,
            reporter: DryRunReporter::new().with_type_resolver(Arc::new(DeclaredTypeResolver::new())),
            groups,
            source_version: config.source_version().map(str::to_owned),
        })
    }

    /// Returns the parsed tree of `path` and its entries ordered by offset.
    pub(crate) fn analyze(&mut self, path: &Utf8Path) -> Result<(SyntaxTree, Vec<ReportEntry>), AppError> {
        let source = fs::read_to_string(path).map_err(|source| AppError::read_source(path, source))?;
        let tree = self.parser.parse_tree(&source)?;
        let mut entries = Vec::new();
        for (severity, rules) in &self.groups {
            let mut options = ReportOptions::new().with_severity(severity.as_str());
            if let Some(version) = &self.source_version {
                options = options.with_source_version(version.as_str());
            }
            entries.extend(self.reporter.analyze(Some(&tree), rules, &options));
        }
        entries.sort_by_key(|entry| entry.offset);
        tracing::debug!(path = %path, entries = entries.len(), "analysed file");
        Ok((tree, entries))
    }
}
