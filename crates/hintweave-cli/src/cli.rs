//! Command-line argument definitions.

use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};

use hintweave_config::{
    CONFIG_PATH_ENV, CONFIG_PATH_FLAG, DEFAULT_CONFIG_FILE, LogFormat, ReportFormat,
};

/// Structural search and rewrite for Java sources.
#[derive(Parser, Debug)]
#[command(
    name = "hintweave",
    version,
    disable_help_subcommand = true,
    args_override_self = true
)]
pub(crate) struct Cli {
    /// Configuration file; defaults to `hintweave.toml` when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) config_path: Option<Utf8PathBuf>,
    /// Log filter expression, for example `hintweave_rules=debug`.
    #[arg(long, global = true, value_name = "FILTER")]
    pub(crate) log_filter: Option<String>,
    /// Log output format: `compact` or `json`.
    #[arg(long, global = true, value_name = "FORMAT")]
    pub(crate) log_format: Option<LogFormat>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Reports every rule match in the given sources.
    Scan(ScanArgs),
    /// Rewrites the given sources with the selected alternatives.
    Apply(ApplyArgs),
    /// Parses hint files and reports their rule counts.
    Check(CheckArgs),
    /// Lists registered hint files.
    List(RuleArgs),
}

/// Rule selection shared by the commands that load rules.
#[derive(Args, Debug, Default)]
pub(crate) struct RuleArgs {
    /// Extra `.hint` file or directory of them; may be repeated.
    #[arg(long = "rules", value_name = "PATH")]
    pub(crate) rules: Vec<Utf8PathBuf>,
    /// Skips the bundled rule libraries.
    #[arg(long)]
    pub(crate) no_bundled: bool,
    /// Source-language version handed to guards, for example `11`.
    #[arg(long, value_name = "VERSION")]
    pub(crate) source_version: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ScanArgs {
    /// Java files or directories to scan.
    #[arg(required = true, value_name = "PATH")]
    pub(crate) paths: Vec<Utf8PathBuf>,
    #[command(flatten)]
    pub(crate) rules: RuleArgs,
    /// Report format: `text`, `json` or `csv`.
    #[arg(long, value_name = "FORMAT")]
    pub(crate) format: Option<ReportFormat>,
}

#[derive(Args, Debug)]
pub(crate) struct ApplyArgs {
    /// Java files or directories to rewrite.
    #[arg(required = true, value_name = "PATH")]
    pub(crate) paths: Vec<Utf8PathBuf>,
    #[command(flatten)]
    pub(crate) rules: RuleArgs,
    /// Writes rewritten sources back instead of printing them.
    #[arg(long)]
    pub(crate) write: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Hint files to parse.
    #[arg(required = true, value_name = "FILE")]
    pub(crate) files: Vec<Utf8PathBuf>,
}

impl Cli {
    /// Returns the arguments handed to the configuration loader.
    ///
    /// Without `--config-path` or `HINTWEAVE_CONFIG_PATH`, `hintweave.toml`
    /// in the working directory is used when present.
    pub(crate) fn config_arguments(&self) -> Vec<OsString> {
        let discovered = std::env::var_os(CONFIG_PATH_ENV)
            .is_none()
            .then_some(Utf8Path::new(DEFAULT_CONFIG_FILE))
            .filter(|path| path.is_file());
        let config_path = self.config_path.as_deref().or(discovered);
        let mut arguments = ConfigArguments::default();
        arguments.push(CONFIG_PATH_FLAG, config_path.map(Utf8Path::as_str));
        arguments.push("--log-filter", self.log_filter.as_deref());
        arguments.push("--log-format", self.log_format.map(|format| format.to_string()));
        let rules = match &self.command {
            Command::Scan(args) => {
                arguments.push("--report-format", args.format.map(|format| format.to_string()));
                Some(&args.rules)
            }
            Command::Apply(args) => Some(&args.rules),
            Command::List(args) => Some(args),
            Command::Check(_) => None,
        };
        if let Some(selection) = rules {
            arguments.push("--source-version", selection.source_version.as_deref());
            for path in &selection.rules {
                arguments.push("--rule-paths", Some(path.as_str()));
            }
        }
        arguments.into_inner()
    }

    /// Returns whether the command skips the bundled libraries.
    pub(crate) const fn skips_bundled(&self) -> bool {
        match &self.command {
            Command::Scan(ScanArgs { rules, .. })
            | Command::Apply(ApplyArgs { rules, .. })
            | Command::List(rules) => rules.no_bundled,
            Command::Check(_) => false,
        }
    }
}

/// Loader arguments, starting with the program name.
struct ConfigArguments(Vec<OsString>);

impl Default for ConfigArguments {
    fn default() -> Self {
        Self(vec![OsString::from("hintweave")])
    }
}

impl ConfigArguments {
    fn push(&mut self, flag: &str, value: Option<impl Into<OsString>>) {
        if let Some(given) = value {
            self.0.push(OsString::from(flag));
            self.0.push(given.into());
        }
    }

    fn into_inner(self) -> Vec<OsString> {
        self.0
    }
}
