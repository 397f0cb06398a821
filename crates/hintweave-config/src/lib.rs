//! Configuration for the hintweave binary.
//!
//! [`Config`] derives its loader from `ortho_config`. Settings are layered
//! from lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. the TOML file named by `--config-path` or `HINTWEAVE_CONFIG_PATH`
//! 3. `HINTWEAVE_*` environment variables
//! 4. command-line flags passed to [`Config::load_from_iter`]
//!
//! Each layer only overrides the fields it sets. Failures surface as
//! [`OrthoError`], shared behind an [`std::sync::Arc`].

mod defaults;
mod logging;
mod report;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    CONFIG_PATH_ENV, CONFIG_PATH_FLAG, DEFAULT_CONFIG_FILE, DEFAULT_LOG_FILTER,
    default_log_filter, default_log_format, default_report_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::OrthoError;
pub use report::{ReportFormat, ReportFormatParseError};

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HINTWEAVE")]
pub struct Config {
    /// Log filter expression, for example `hintweave_rules=debug`.
    #[ortho_config(default = default_log_filter().to_owned())]
    log_filter: String,
    /// Log output format: `compact` or `json`.
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
    /// Source-language version handed to guards, for example `11`.
    #[serde(default)]
    source_version: Option<String>,
    /// Extra `.hint` files or directories of them.
    #[serde(default)]
    rule_paths: Vec<Utf8PathBuf>,
    /// Whether the bundled rule libraries are loaded.
    #[ortho_config(default = true)]
    bundled: bool,
    /// Report format: `text`, `json` or `csv`.
    #[ortho_config(default = default_report_format())]
    report_format: ReportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
            source_version: None,
            rule_paths: Vec::new(),
            bundled: true,
            report_format: default_report_format(),
        }
    }
}

impl Config {
    /// Returns the log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the source-language version handed to guards.
    #[must_use]
    pub fn source_version(&self) -> Option<&str> {
        self.source_version.as_deref()
    }

    /// Returns extra rule files and directories.
    #[must_use]
    pub fn rule_paths(&self) -> &[Utf8PathBuf] {
        &self.rule_paths
    }

    /// Returns whether bundled libraries are loaded.
    #[must_use]
    pub const fn bundled(&self) -> bool {
        self.bundled
    }

    /// Returns the report output format.
    #[must_use]
    pub const fn report_format(&self) -> ReportFormat {
        self.report_format
    }
}
