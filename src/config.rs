//! Engine configuration loaded from TOML
//!
//! A configuration names the providers to consult, in order, and the search
//! roots of each. It also carries the compile options that used to be
//! process-wide settings.
//!
//! ```toml
//! redirect_must_be_first = true
//!
//! [[providers]]
//! name = "filesystem"
//! roots = ["templates", "base_templates"]
//!
//! [[providers]]
//! name = "apps"
//! roots = ["app1/templates", "app2/templates"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::provider::{DirectoryProvider, ProviderChain};
use crate::template::CompileOptions;

/// Errors that can occur when loading or parsing a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Provider #{0} has an empty name")]
    EmptyProviderName(usize),
}

/// One provider and its search roots
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_redirect_must_be_first")]
    pub redirect_must_be_first: bool,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

fn default_redirect_must_be_first() -> bool {
    CompileOptions::default().redirect_must_be_first
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            redirect_must_be_first: default_redirect_must_be_first(),
            providers: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// Relative roots are resolved against the directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        if let Some(index) = config.providers.iter().position(|p| p.name.trim().is_empty()) {
            return Err(ConfigError::EmptyProviderName(index + 1));
        }
        Ok(config)
    }

    /// Append a provider with the given roots
    pub fn with_provider(
        mut self,
        name: impl Into<String>,
        roots: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.providers.push(ProviderConfig {
            name: name.into(),
            roots: roots.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Enable or disable the first-position policy for redirects
    pub fn with_redirect_must_be_first(mut self, enabled: bool) -> Self {
        self.redirect_must_be_first = enabled;
        self
    }

    /// Resolve relative roots against `base`
    pub fn rebase(&mut self, base: &Path) {
        for provider in &mut self.providers {
            for root in &mut provider.roots {
                if root.is_relative() {
                    *root = base.join(&*root);
                }
            }
        }
    }

    /// Compile options derived from this configuration
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::new().with_redirect_must_be_first(self.redirect_must_be_first)
    }

    /// Build the provider chain, one directory provider per entry
    pub fn build_chain(&self) -> ProviderChain {
        self.providers
            .iter()
            .fold(ProviderChain::new(), |chain, provider| {
                chain.with_provider(DirectoryProvider::new(
                    provider.name.clone(),
                    provider.roots.iter().cloned(),
                ))
            })
    }
}
