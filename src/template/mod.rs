//! Override-chain resolution
//!
//! A template name may be defined once per search root. Definitions reached
//! earlier in the provider chain are more specific, and a definition that
//! starts with `{% override "name" %}` extends the next definition of the same
//! name instead of replacing it.
//!
//! # Example
//!
//! ```text
//! // site/templates/page.html (depth 1)
//! {% override "page.html" %}
//! {% block title %}{{ block.super }} | Site{% endblock %}
//!
//! // vendor/templates/page.html (depth 2, the root)
//! <title>{% block title %}Vendor{% endblock %}</title>
//! ```

mod chain;
mod context;
mod error;
mod link;
mod resolver;

pub use chain::{resolve_chain, FragmentBody, FragmentTable, Layer, ResolutionContext, ResolvedChain};
pub use context::{display_value, Context, ContextError};
pub use error::{ResolutionError, Violation};
pub use link::{ChainLink, CompileOptions, Definition};
pub use resolver::resolve;
