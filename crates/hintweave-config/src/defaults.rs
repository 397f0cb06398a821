use crate::logging::LogFormat;
use crate::report::ReportFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration file looked up in the working directory when no path is
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "hintweave.toml";

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "HINTWEAVE_CONFIG_PATH";

/// Flag naming the configuration file.
pub const CONFIG_PATH_FLAG: &str = "--config-path";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default report format.
#[must_use]
pub const fn default_report_format() -> ReportFormat {
    ReportFormat::Text
}
