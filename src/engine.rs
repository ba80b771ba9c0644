//! Assembled engine: a provider chain plus compile options

use crate::config::EngineConfig;
use crate::provider::{Match, ProviderChain};
use crate::renderer;
use crate::template::{self, CompileOptions, Context, ResolutionError, ResolvedChain};

/// Entry point for resolving and rendering overridable templates
///
/// An engine holds no per-request state and can be shared across threads.
#[derive(Debug, Default)]
pub struct Engine {
    chain: ProviderChain,
    options: CompileOptions,
}

impl Engine {
    /// Create an engine with default compile options
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain,
            options: CompileOptions::default(),
        }
    }

    /// Assemble an engine from a configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            chain: config.build_chain(),
            options: config.compile_options(),
        }
    }

    /// Set the compile options
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Fetch one specific override layer of `name`
    pub fn resolve(&self, name: &str, depth: usize) -> Result<Match, ResolutionError> {
        template::resolve(&self.chain, name, depth)
    }

    /// Walk and merge the override chain of `name`
    pub fn resolve_chain(&self, name: &str, context: &Context) -> Result<ResolvedChain, ResolutionError> {
        template::resolve_chain(&self.chain, name, context, &self.options)
    }

    /// Resolve the chain of `name` and render it
    pub fn render(&self, name: &str, context: &Context) -> Result<String, ResolutionError> {
        let resolved = self.resolve_chain(name, context)?;
        Ok(renderer::render(&resolved, context))
    }
}
