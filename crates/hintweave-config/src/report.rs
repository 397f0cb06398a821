use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output formats for scan reports.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReportFormat {
    /// One line per finding, for terminals.
    #[default]
    Text,
    /// A pretty-printed JSON array of findings.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

/// Errors encountered while parsing a [`ReportFormat`] from text.
pub type ReportFormatParseError = strum::ParseError;
