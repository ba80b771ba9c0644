//! Text rendering of a resolved chain

use std::collections::HashMap;

use crate::parser::ast::{Node, Spanned};
use crate::template::{Context, FragmentTable, ResolvedChain};

/// Render the root definition, filling fragments from the merged table
pub fn render(resolved: &ResolvedChain, context: &Context) -> String {
    let mut renderer = TextRenderer::new(&resolved.table, context);
    let mut out = String::new();
    renderer.render_nodes(&resolved.root.document.nodes, &mut out);
    out
}

struct TextRenderer<'a> {
    table: &'a FragmentTable,
    context: &'a Context,
    /// Next layer to use for each fragment currently on the stack
    cursors: HashMap<&'a str, usize>,
    /// Fragments being rendered, innermost last
    stack: Vec<&'a str>,
}

impl<'a> TextRenderer<'a> {
    fn new(table: &'a FragmentTable, context: &'a Context) -> Self {
        Self {
            table,
            context,
            cursors: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn render_nodes(&mut self, nodes: &'a [Spanned<Node>], out: &mut String) {
        for spanned in nodes {
            match &spanned.node {
                Node::Text(text) => out.push_str(text),
                Node::Variable(path) => out.push_str(&self.context.display(path)),
                Node::Fragment(decl) => self.render_fragment(&decl.name.node, out),
                Node::Super => {
                    if let Some(name) = self.stack.last().copied() {
                        self.render_fragment(name, out);
                    }
                }
                Node::Redirect(_) | Node::Extends(_) => {}
            }
        }
    }

    /// Render the next unused layer of `name`
    ///
    /// The cursor is advanced while the body renders and restored afterwards,
    /// so `block.super` reaches the following layer and a fragment nested in
    /// its own body cannot recurse forever.
    fn render_fragment(&mut self, name: &'a str, out: &mut String) {
        let Some(bodies) = self.table.get(name) else {
            return;
        };
        let index = self.cursors.get(name).copied().unwrap_or(0);
        let Some(layer) = bodies.get(index) else {
            return;
        };

        self.cursors.insert(name, index + 1);
        self.stack.push(name);
        self.render_nodes(&layer.body, out);
        self.stack.pop();
        if index == 0 {
            self.cursors.remove(name);
        } else {
            self.cursors.insert(name, index);
        }
    }
}
