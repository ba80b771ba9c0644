//! Chain walking - merging same-named definitions layer by layer
//!
//! Starting from the most specific definition of a name, each definition that
//! redirects to the same name pulls in the next deeper layer. The walk stops at
//! the first definition without a redirect. A root that declares
//! `{% extends "other" %}` continues with the override chain of `other`, whose
//! layers are less derived than every layer before them. Every layer's
//! fragments are kept, most-derived first, so the renderer can delegate from
//! one layer to the next.

use std::collections::HashMap;

use crate::parser::ast::{FragmentDecl, Node, Spanned};
use crate::provider::ProviderChain;

use super::context::Context;
use super::error::ResolutionError;
use super::link::{CompileOptions, Definition};
use super::resolver::resolve;

/// Origin metadata for one merged layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Template name the layer was resolved under
    pub name: String,
    pub depth: usize,
    pub origin: String,
}

/// One layer's body of a fragment
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentBody {
    pub depth: usize,
    pub origin: String,
    pub body: Vec<Spanned<Node>>,
}

/// Fragment bodies of every layer, grouped by fragment name
#[derive(Debug, Clone, Default)]
pub struct FragmentTable {
    layers: Vec<Layer>,
    fragments: HashMap<String, Vec<FragmentBody>>,
}

impl FragmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a definition as a layer less derived than every layer so far
    pub fn push_layer(&mut self, name: &str, depth: usize, origin: &str, fragments: &[FragmentDecl]) {
        self.layers.push(Layer {
            name: name.to_string(),
            depth,
            origin: origin.to_string(),
        });
        for decl in fragments {
            self.fragments
                .entry(decl.name.node.clone())
                .or_default()
                .push(FragmentBody {
                    depth,
                    origin: origin.to_string(),
                    body: decl.body.clone(),
                });
        }
    }

    /// Bodies of a fragment, most-derived first
    pub fn get(&self, name: &str) -> Option<&[FragmentBody]> {
        self.fragments.get(name).map(|bodies| bodies.as_slice())
    }

    /// Body that wins for a fragment
    pub fn most_derived(&self, name: &str) -> Option<&FragmentBody> {
        self.get(name).and_then(|bodies| bodies.first())
    }

    /// Merged layers, most-derived first
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// Number of distinct fragment names
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// State of a single top-level resolution
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// The name every link in the chain must redirect to
    name: String,
    /// Override level of the next lookup
    depth: usize,
}

impl ResolutionContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depth: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Move one layer deeper
    pub fn advance(&mut self) {
        self.depth += 1;
    }
}

/// Result of walking a chain: the merged fragments plus the root definition
#[derive(Debug, Clone)]
pub struct ResolvedChain {
    pub name: String,
    pub table: FragmentTable,
    /// Least-derived definition, whose layout is rendered
    pub root: Definition,
}

impl ResolvedChain {
    pub fn layers(&self) -> &[Layer] {
        self.table.layers()
    }
}

/// Walk the override chain for `name` and merge its fragments
///
/// Fails with `NotFound` when no definition of `name` exists at all and with
/// `MissingOverrideTarget` when a redirect points past the last definition.
/// When the chain's root extends another template, that template's chain is
/// walked next and merged below it.
pub fn resolve_chain(
    chain: &ProviderChain,
    name: &str,
    context: &Context,
    options: &CompileOptions,
) -> Result<ResolvedChain, ResolutionError> {
    let mut table = FragmentTable::new();
    let mut visited = vec![name.to_string()];
    let mut root = walk_overrides(chain, ResolutionContext::new(name), context, options, &mut table)?;

    while let Some(parent) = root.extends() {
        let target = parent.target(context, &root.origin)?;
        if visited.contains(&target) {
            return Err(ResolutionError::CircularExtends {
                name: target,
                origin: root.origin.clone(),
            });
        }
        tracing::debug!(origin = %root.origin, extends = %target, "following extends");
        visited.push(target.clone());
        root = walk_overrides(chain, ResolutionContext::new(target), context, options, &mut table)?;
    }

    tracing::debug!(
        name,
        layers = table.layer_count(),
        root = %root.origin,
        "override chain resolved"
    );
    Ok(ResolvedChain {
        name: name.to_string(),
        table,
        root,
    })
}

/// Merge the override chain of one name into `table`, returning its root
fn walk_overrides(
    chain: &ProviderChain,
    mut ctx: ResolutionContext,
    context: &Context,
    options: &CompileOptions,
    table: &mut FragmentTable,
) -> Result<Definition, ResolutionError> {
    loop {
        let found = match resolve(chain, ctx.name(), ctx.depth()) {
            Ok(found) => found,
            Err(ResolutionError::NotFound { .. }) if ctx.depth() > 1 => {
                return Err(ResolutionError::missing_override_target(
                    ctx.name(),
                    ctx.depth(),
                ));
            }
            Err(e) => return Err(e),
        };

        let definition = Definition::compile(&found.content, found.origin, options)?;
        table.push_layer(ctx.name(), ctx.depth(), &definition.origin, definition.fragments());

        let Some(link) = definition.link() else {
            return Ok(definition);
        };

        let target = link.target(context, &definition.origin)?;
        if target != ctx.name() {
            return Err(ResolutionError::divergent(
                ctx.name(),
                target,
                definition.origin.as_str(),
            ));
        }

        tracing::debug!(
            name = ctx.name(),
            depth = ctx.depth(),
            origin = %definition.origin,
            "merged override layer"
        );
        ctx.advance();
    }
}
