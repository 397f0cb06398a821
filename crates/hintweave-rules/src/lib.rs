//! Rule files, guards and batch matching for hintweave.
//!
//! This crate builds on `hintweave-syntax` to turn `.hint` rule files into
//! [`TransformationRule`]s and run them over syntax trees:
//!
//! - **Guards** via [`GuardExpression`] and an injected [`GuardRegistry`]
//! - **Rule files** via [`parse_hint_file`], producing [`HintFile`]s
//! - **Batch matching** via [`PatternIndex`], one tree walk per pattern kind
//! - **Storage** via [`HintStore`], with cycle-safe include resolution and
//!   one-shot loading of [`BundledLibraries`]
//! - **Reporting** via [`DryRunReporter`], rendered with [`to_json`] or
//!   [`to_csv`]
//!
//! Rules can also be declared in code as [`RuleRecord`]s collected in a
//! [`RuleCatalog`].

mod bundled;
mod catalog;
mod error;
mod guard;
mod hint_file;
mod hint_parser;
mod imports;
mod index;
mod report;
mod rule;
mod store;

pub use bundled::{BundledLibraries, DirectoryLibraries, LibrarySource};
pub use catalog::{RuleCatalog, RuleRecord};
pub use error::{CatalogError, GuardParseError, HintParseError, StoreError};
pub use guard::{GuardArg, GuardContext, GuardExpression, GuardFn, GuardRegistry, parse_guard};
pub use hint_file::{DEFAULT_SEVERITY, HintFile};
pub use hint_parser::parse_hint_file;
pub use imports::ImportDirective;
pub use index::{PatternIndex, RuleMatches};
pub use report::{DryRunReporter, ReportEntry, ReportOptions, to_csv, to_csv_by_file, to_json};
pub use rule::{RewriteAlternative, TransformationRule};
pub use store::HintStore;

#[cfg(test)]
mod tests;
