//! Search providers and the ordered chain they form
//!
//! A [`SearchProvider`] enumerates every definition of a template name across
//! its own search roots, in root order. A [`ProviderChain`] fixes the order in
//! which providers are consulted. Together they define the global match
//! sequence that override depths index into.

mod directory;
mod memory;

use std::fmt;

pub use directory::DirectoryProvider;
pub use memory::MemoryProvider;

/// A single definition found by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Raw template source
    pub content: String,
    /// Display identifier of where the source came from
    pub origin: String,
}

impl Match {
    pub fn new(content: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            origin: origin.into(),
        }
    }
}

/// Ordered enumerator of named resources over a fixed set of search roots
pub trait SearchProvider: fmt::Debug + Send + Sync {
    /// Short label used in diagnostics
    fn label(&self) -> &str;

    /// Lazily enumerate the definitions of `name`, one per matching root,
    /// in root order. Every call restarts from the first root.
    fn matches<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = Match> + 'a>;
}

/// Ordered list of providers consulted during resolution
#[derive(Debug, Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn SearchProvider>>,
}

impl ProviderChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; it is consulted after every provider already added
    pub fn with_provider(mut self, provider: impl SearchProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Append an already boxed provider
    pub fn with_boxed(mut self, provider: Box<dyn SearchProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Providers in consultation order
    pub fn providers(&self) -> impl Iterator<Item = &dyn SearchProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Total number of definitions of `name` across all providers
    pub fn count_matches(&self, name: &str) -> usize {
        self.providers().map(|p| p.matches(name).count()).sum()
    }
}
