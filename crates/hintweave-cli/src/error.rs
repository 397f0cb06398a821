//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use hintweave_rules::StoreError;
use hintweave_syntax::SyntaxError;
use ortho_config::OrthoError;

use crate::telemetry::TelemetryError;

/// Top-level error for a command run.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<OrthoError>),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// A rule file given by the user could not be registered.
    #[error(transparent)]
    Rules(#[from] StoreError),
    /// A rule path is neither a file nor a directory.
    #[error("rule path {path} does not exist")]
    MissingRulePath {
        /// The path as given.
        path: Utf8PathBuf,
    },
    /// A source path could not be listed.
    #[error("failed to read {path}: {source}")]
    ReadSource {
        /// The path being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The Java parser could not be initialised.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A rewritten source could not be written back.
    #[error("failed to write {path}: {source}")]
    WriteSource {
        /// The destination path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The report could not be serialised.
    #[error("failed to serialise report: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    /// One or more inputs failed; details were already reported.
    #[error("{failed} of {total} inputs failed")]
    Failures {
        /// Number of failed inputs.
        failed: usize,
        /// Number of inputs processed.
        total: usize,
    },
}

impl AppError {
    /// Creates a source read error.
    pub(crate) fn read_source(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::ReadSource {
            path: path.into(),
            source,
        }
    }

    /// Creates a source write error.
    pub(crate) fn write_source(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::WriteSource {
            path: path.into(),
            source,
        }
    }
}
