//! Compiled definitions and their chain links
//!
//! Compiling a definition parses its source and extracts the two things the
//! chain walk needs from it: the optional redirect declaration (the
//! [`ChainLink`]) and the fragments it supplies.

use std::collections::HashSet;

use crate::parser::ast::{Document, FragmentDecl, Node, ParentRef, Span, Spanned};
use crate::parser::parse;

use super::context::Context;
use super::error::{ResolutionError, Violation};

/// Options that affect how definitions are compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Require the redirect declaration to be the first non-text node
    pub redirect_must_be_first: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            redirect_must_be_first: true,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the redirect must occupy the first structural position
    pub fn with_redirect_must_be_first(mut self, enabled: bool) -> Self {
        self.redirect_must_be_first = enabled;
        self
    }
}

/// The redirect declaration of a definition
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    pub parent: ParentRef,
    pub span: Span,
}

impl ChainLink {
    /// Evaluate the parent reference to a template name
    pub fn target(&self, context: &Context, origin: &str) -> Result<String, ResolutionError> {
        match &self.parent {
            ParentRef::Literal(name) if name.is_empty() => Err(ResolutionError::InvalidTarget {
                origin: origin.to_string(),
                expression: self.parent.to_string(),
                reason: "template name is empty".to_string(),
            }),
            ParentRef::Literal(name) => Ok(name.clone()),
            ParentRef::Deferred(path) => {
                let invalid = |reason: &str| ResolutionError::InvalidTarget {
                    origin: origin.to_string(),
                    expression: path.to_string(),
                    reason: reason.to_string(),
                };
                match context.lookup(path) {
                    Some(toml::Value::String(name)) if !name.is_empty() => Ok(name.clone()),
                    Some(toml::Value::String(_)) => Err(invalid("template name is empty")),
                    Some(_) => Err(invalid("value is not a string")),
                    None => Err(invalid("variable is not defined")),
                }
            }
        }
    }
}

/// A parsed definition with its chain link extracted
#[derive(Debug, Clone)]
pub struct Definition {
    pub origin: String,
    pub document: Document,
    link: Option<ChainLink>,
    extends: Option<ChainLink>,
    fragments: Vec<FragmentDecl>,
}

impl Definition {
    /// Parse `source` and extract its redirect and fragment declarations
    pub fn compile(
        source: &str,
        origin: impl Into<String>,
        options: &CompileOptions,
    ) -> Result<Self, ResolutionError> {
        let origin = origin.into();
        let document = parse(source).map_err(|errors| ResolutionError::Parse {
            origin: origin.clone(),
            content: source.to_string(),
            errors,
        })?;

        let mut collector = Collector::default();
        collector.visit(&document.nodes, true);

        let link = match collector.redirects.as_slice() {
            [] => None,
            [(parent, span, top_level_index)] => {
                if options.redirect_must_be_first
                    && *top_level_index != first_significant(&document.nodes)
                {
                    return Err(ResolutionError::structural(
                        origin,
                        Violation::MisplacedRedirect,
                        span.clone(),
                    ));
                }
                Some(ChainLink {
                    parent: parent.clone(),
                    span: span.clone(),
                })
            }
            [_, (_, span, _), ..] => {
                return Err(ResolutionError::structural(
                    origin,
                    Violation::DuplicateRedirect,
                    span.clone(),
                ));
            }
        };

        // Unlike a redirect, `extends` is always held to the first position
        let extends = match collector.extends.as_slice() {
            [] => None,
            [(parent, span, top_level_index)] => {
                if link.is_some() {
                    return Err(ResolutionError::structural(
                        origin,
                        Violation::OverrideWithExtends,
                        span.clone(),
                    ));
                }
                if *top_level_index != first_significant(&document.nodes) {
                    return Err(ResolutionError::structural(
                        origin,
                        Violation::MisplacedExtends,
                        span.clone(),
                    ));
                }
                Some(ChainLink {
                    parent: parent.clone(),
                    span: span.clone(),
                })
            }
            [_, (_, span, _), ..] => {
                return Err(ResolutionError::structural(
                    origin,
                    Violation::DuplicateExtends,
                    span.clone(),
                ));
            }
        };

        if let Some((name, span)) = collector.duplicate {
            return Err(ResolutionError::structural(
                origin,
                Violation::DuplicateFragment(name),
                span,
            ));
        }

        Ok(Self {
            origin,
            document,
            link,
            extends,
            fragments: collector.fragments,
        })
    }

    /// The redirect declaration, if this definition overrides another layer
    pub fn link(&self) -> Option<&ChainLink> {
        self.link.as_ref()
    }

    /// A definition without a redirect terminates the chain
    pub fn is_root(&self) -> bool {
        self.link.is_none()
    }

    /// The `extends` declaration of a chain root, if any
    pub fn extends(&self) -> Option<&ChainLink> {
        self.extends.as_ref()
    }

    /// Every fragment declared in this definition, nested ones included
    pub fn fragments(&self) -> &[FragmentDecl] {
        &self.fragments
    }
}

/// Index of the first top-level node that is not trivial
fn first_significant(nodes: &[Spanned<Node>]) -> Option<usize> {
    nodes.iter().position(|n| !n.node.is_trivial())
}

#[derive(Default)]
struct Collector {
    /// Redirects with their span and top-level index (None when nested)
    redirects: Vec<(ParentRef, Span, Option<usize>)>,
    extends: Vec<(ParentRef, Span, Option<usize>)>,
    fragments: Vec<FragmentDecl>,
    seen: HashSet<String>,
    duplicate: Option<(String, Span)>,
}

impl Collector {
    fn visit(&mut self, nodes: &[Spanned<Node>], top_level: bool) {
        for (index, spanned) in nodes.iter().enumerate() {
            match &spanned.node {
                Node::Redirect(parent) => {
                    let position = top_level.then_some(index);
                    self.redirects
                        .push((parent.clone(), spanned.span.clone(), position));
                }
                Node::Extends(parent) => {
                    let position = top_level.then_some(index);
                    self.extends
                        .push((parent.clone(), spanned.span.clone(), position));
                }
                Node::Fragment(decl) => {
                    if !self.seen.insert(decl.name.node.clone()) && self.duplicate.is_none() {
                        self.duplicate = Some((decl.name.node.clone(), decl.name.span.clone()));
                    }
                    self.fragments.push(decl.clone());
                    self.visit(&decl.body, false);
                }
                Node::Text(_) | Node::Variable(_) | Node::Super => {}
            }
        }
    }
}
