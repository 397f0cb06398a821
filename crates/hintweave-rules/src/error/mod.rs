//! Error types for rule files, guards and the rule store.
//!
//! Parse errors carry the one-based line of the offending construct so a
//! caller can point at it. Guard misses and failed matches are not errors
//! and never appear here.

use std::io;

use hintweave_syntax::SyntaxError;
use thiserror::Error;

/// Errors raised while parsing a guard expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct GuardParseError {
    position: usize,
    message: String,
}

impl GuardParseError {
    /// Creates an error at a byte position of the guard text.
    #[must_use]
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    /// Returns the byte position the parser stopped at.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while parsing `.hint` rule files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HintParseError {
    /// The input is empty or blank.
    #[error("hint file content is empty")]
    Empty,

    /// A rule block reached the end of input without `;;`.
    #[error("rule starting at line {line} is missing its ';;' terminator")]
    Unterminated {
        /// First line of the block.
        line: usize,
    },

    /// A metadata directive used a key the parser does not know.
    #[error("unknown metadata key `{key}` (line {line})")]
    UnknownMetadataKey {
        /// The unrecognised key.
        key: String,
        /// Line of the directive.
        line: usize,
    },

    /// A metadata directive is not of the form `<!key: value>`.
    #[error("malformed metadata directive `{text}` (line {line}): {message}")]
    MalformedMetadata {
        /// The directive as written.
        text: String,
        /// Description of the problem.
        message: String,
        /// Line of the directive.
        line: usize,
    },

    /// An import directive is missing or has too many operands.
    #[error("malformed `{directive}` directive (line {line}): {message}")]
    MalformedDirective {
        /// The directive keyword.
        directive: String,
        /// Description of the problem.
        message: String,
        /// Line of the directive.
        line: usize,
    },

    /// A guard expression failed to parse.
    #[error("invalid guard expression (line {line}): {source}")]
    Guard {
        /// Line of the guard.
        line: usize,
        /// The guard parser's error.
        #[source]
        source: GuardParseError,
    },

    /// A source pattern or replacement failed to compile.
    #[error("invalid pattern (line {line}): {source}")]
    Pattern {
        /// Line of the pattern.
        line: usize,
        /// The compiler's error.
        #[source]
        source: SyntaxError,
    },

    /// A metadata directive follows the first rule block.
    #[error("metadata directive `{text}` must precede the first rule (line {line})")]
    MetadataAfterRule {
        /// The directive as written.
        text: String,
        /// Line of the directive.
        line: usize,
    },

    /// `minLanguageVersion` is not a number.
    #[error("invalid minLanguageVersion `{value}` (line {line})")]
    InvalidMinVersion {
        /// The value as written.
        value: String,
        /// Line of the directive.
        line: usize,
    },

    /// A rule block holds a description but no source pattern.
    #[error("rule has a description but no source pattern (line {line})")]
    MissingPattern {
        /// Line of the description.
        line: usize,
    },

    /// A line inside a rule block is neither an alternative nor a
    /// directive.
    #[error("expected '=>' or ';;' but found `{text}` (line {line})")]
    UnexpectedLine {
        /// The offending line.
        text: String,
        /// Its line number.
        line: usize,
    },

    /// A rule declares a second unconditional alternative.
    #[error("rule has more than one unconditional alternative (line {line})")]
    DuplicateOtherwise {
        /// Line of the second unconditional alternative.
        line: usize,
    },
}

impl HintParseError {
    /// Creates an unterminated block error.
    #[must_use]
    pub const fn unterminated(line: usize) -> Self {
        Self::Unterminated { line }
    }

    /// Creates an unknown metadata key error.
    #[must_use]
    pub fn unknown_metadata_key(key: impl Into<String>, line: usize) -> Self {
        Self::UnknownMetadataKey {
            key: key.into(),
            line,
        }
    }

    /// Creates a malformed metadata error.
    #[must_use]
    pub fn malformed_metadata(
        text: impl Into<String>,
        message: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::MalformedMetadata {
            text: text.into(),
            message: message.into(),
            line,
        }
    }

    /// Creates a malformed directive error.
    #[must_use]
    pub fn malformed_directive(
        directive: impl Into<String>,
        message: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::MalformedDirective {
            directive: directive.into(),
            message: message.into(),
            line,
        }
    }

    /// Creates a guard error.
    #[must_use]
    pub const fn guard(line: usize, source: GuardParseError) -> Self {
        Self::Guard { line, source }
    }

    /// Creates a pattern error.
    #[must_use]
    pub const fn pattern(line: usize, source: SyntaxError) -> Self {
        Self::Pattern { line, source }
    }

    /// Creates an error for metadata following a rule block.
    #[must_use]
    pub fn metadata_after_rule(text: impl Into<String>, line: usize) -> Self {
        Self::MetadataAfterRule {
            text: text.into(),
            line,
        }
    }

    /// Creates an invalid minimum version error.
    #[must_use]
    pub fn invalid_min_version(value: impl Into<String>, line: usize) -> Self {
        Self::InvalidMinVersion {
            value: value.into(),
            line,
        }
    }

    /// Creates a missing pattern error.
    #[must_use]
    pub const fn missing_pattern(line: usize) -> Self {
        Self::MissingPattern { line }
    }

    /// Creates an unexpected line error.
    #[must_use]
    pub fn unexpected_line(text: impl Into<String>, line: usize) -> Self {
        Self::UnexpectedLine {
            text: text.into(),
            line,
        }
    }

    /// Creates a duplicate unconditional alternative error.
    #[must_use]
    pub const fn duplicate_otherwise(line: usize) -> Self {
        Self::DuplicateOtherwise { line }
    }

    /// Returns the one-based line the error refers to, or zero for empty
    /// input.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Unterminated { line }
            | Self::UnknownMetadataKey { line, .. }
            | Self::MalformedMetadata { line, .. }
            | Self::MalformedDirective { line, .. }
            | Self::Guard { line, .. }
            | Self::Pattern { line, .. }
            | Self::MetadataAfterRule { line, .. }
            | Self::InvalidMinVersion { line, .. }
            | Self::MissingPattern { line }
            | Self::UnexpectedLine { line, .. }
            | Self::DuplicateOtherwise { line } => *line,
        }
    }
}

/// Errors raised by the rule store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A hint file failed to parse.
    #[error("failed to parse hint file `{key}`: {source}")]
    Parse {
        /// The registration key.
        key: String,
        /// The parser's error.
        #[source]
        source: HintParseError,
    },

    /// A hint file could not be read.
    #[error("failed to read hint file `{key}`: {source}")]
    Io {
        /// The registration key.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No hint file is registered under the key.
    #[error("no hint file registered under `{key}`")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// The hint file is not an inferred one.
    #[error("hint file `{key}` is not inferred")]
    NotInferred {
        /// The key of the file.
        key: String,
    },
}

impl StoreError {
    /// Creates a parse error.
    #[must_use]
    pub fn parse(key: impl Into<String>, source: HintParseError) -> Self {
        Self::Parse {
            key: key.into(),
            source,
        }
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(key: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a not-inferred error.
    #[must_use]
    pub fn not_inferred(key: impl Into<String>) -> Self {
        Self::NotInferred { key: key.into() }
    }
}

/// Errors raised by the code-declared rule catalogue.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// A record with the same id is already registered.
    #[error("rule `{id}` is already registered")]
    Duplicate {
        /// The duplicated id.
        id: String,
    },

    /// A record's pattern failed to compile.
    #[error("rule `{id}` has an invalid pattern: {source}")]
    Pattern {
        /// The record id.
        id: String,
        /// The compiler's error.
        #[source]
        source: SyntaxError,
    },
}
