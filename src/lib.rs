//! Template Override - resolution of override chains across search roots
//!
//! This library locates templates by name across an ordered chain of search
//! providers, follows `{% override %}` redirects from the most specific
//! definition down to the root, and merges every layer's fragments so the
//! most-derived definition of each fragment wins.
//!
//! # Example
//!
//! ```rust
//! use template_override::{render, Context, MemoryProvider, ProviderChain};
//!
//! let chain = ProviderChain::new().with_provider(
//!     MemoryProvider::new("memory")
//!         .with_root("site", [("page.html", r#"{% override "page.html" %}{% block title %}Site{% endblock %}"#)])
//!         .with_root("base", [("page.html", "<h1>{% block title %}Base{% endblock %}</h1>")]),
//! );
//!
//! let html = render(&chain, "page.html", &Context::new()).unwrap();
//! assert_eq!(html, "<h1>Site</h1>");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod provider;
pub mod renderer;
pub mod template;

pub use config::{ConfigError, EngineConfig, ProviderConfig};
pub use engine::Engine;
pub use error::ParseError;
pub use parser::{parse, Document};
pub use provider::{DirectoryProvider, Match, MemoryProvider, ProviderChain, SearchProvider};
pub use template::{
    resolve, resolve_chain, CompileOptions, Context, ContextError, FragmentTable,
    ResolutionError, ResolvedChain,
};

use thiserror::Error;

/// Errors that can occur between loading a configuration and rendering
#[derive(Debug, Error)]
pub enum Error {
    /// Error loading the engine configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error resolving an override chain
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Resolve and render `name` with default compile options
///
/// # Example
///
/// ```rust
/// use template_override::{render, Context, MemoryProvider, ProviderChain};
///
/// let chain = ProviderChain::new().with_provider(
///     MemoryProvider::new("memory").with_root("site", [("hello.txt", "Hello {{ user.name }}!")]),
/// );
/// let ctx = Context::from_toml_str("[user]\nname = \"Ada\"").unwrap();
///
/// assert_eq!(render(&chain, "hello.txt", &ctx).unwrap(), "Hello Ada!");
/// ```
pub fn render(chain: &ProviderChain, name: &str, context: &Context) -> Result<String, ResolutionError> {
    let resolved = resolve_chain(chain, name, context, &CompileOptions::default())?;
    Ok(renderer::render(&resolved, context))
}

/// Build an engine from `config`, then resolve and render `name`
pub fn render_with_config(config: &EngineConfig, name: &str, context: &Context) -> Result<String, Error> {
    let engine = Engine::from_config(config);
    Ok(engine.render(name, context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ProviderChain {
        ProviderChain::new()
            .with_provider(MemoryProvider::new("first").with_root(
                "project",
                [("page.html", r#"{% override "page.html" %}{% block body %}project{% endblock %}"#)],
            ))
            .with_provider(MemoryProvider::new("second").with_root(
                "library",
                [("page.html", "[{% block head %}head{% endblock %}|{% block body %}body{% endblock %}]")],
            ))
    }

    #[test]
    fn test_render_across_providers() {
        let out = render(&chain(), "page.html", &Context::new()).unwrap();
        assert_eq!(out, "[head|project]");
    }

    #[test]
    fn test_render_not_found() {
        let err = render(&chain(), "missing.html", &Context::new()).unwrap_err();
        assert!(matches!(err, ResolutionError::NotFound { .. }));
        assert!(err.to_string().contains("missing.html"));
    }

    #[test]
    fn test_render_with_empty_config() {
        let err = render_with_config(&EngineConfig::default(), "page.html", &Context::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_parse_reexport() {
        let doc = parse("a {{ b }} c").unwrap();
        assert_eq!(doc.nodes.len(), 3);
    }
}
