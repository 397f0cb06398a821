//! Name-to-function table for guard calls.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{GuardArg, GuardContext, builtins};

/// A guard function: evaluates its arguments against a match.
pub type GuardFn = Arc<dyn Fn(&GuardContext<'_, '_>, &[GuardArg]) -> bool + Send + Sync>;

/// Guard functions available to guard expressions, keyed by name.
///
/// The registry is passed explicitly through [`GuardContext`]; nothing is
/// registered globally.
#[derive(Clone, Default)]
pub struct GuardRegistry {
    guards: HashMap<String, GuardFn>,
}

impl fmt::Debug for GuardRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardRegistry")
            .field("guards", &self.names())
            .finish()
    }
}

impl GuardRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in guards.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    /// Registers `guard` under `name`, returning the function it replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, guard: F) -> Option<GuardFn>
    where
        F: Fn(&GuardContext<'_, '_>, &[GuardArg]) -> bool + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Arc::new(guard))
    }

    /// Returns whether a function is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.guards.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Returns `true` when no functions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Calls the function registered under `name`. An unknown name
    /// evaluates to `false`.
    #[must_use]
    pub fn call(&self, name: &str, ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
        match self.guards.get(name) {
            Some(guard) => guard(ctx, args),
            None => {
                tracing::warn!(guard = %name, "unknown guard function evaluates to false");
                false
            }
        }
    }
}
