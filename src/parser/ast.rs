//! Abstract Syntax Tree types for the template language

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Dotted lookup path such as `user.name` or `items.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarPath(pub Vec<String>);

impl VarPath {
    /// Parse a dotted path, rejecting empty or malformed segments
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }

        let mut segments = Vec::new();
        for segment in expr.split('.') {
            if !is_valid_segment(segment) {
                return None;
            }
            segments.push(segment.to_string());
        }
        Some(Self(segments))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// `block.super` delegates to the next less-derived fragment body
    pub fn is_super(&self) -> bool {
        self.0.len() == 2 && self.0[0] == "block" && self.0[1] == "super"
    }
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => segment.chars().all(|c| c.is_ascii_digit()),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl std::fmt::Display for VarPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Target of a redirect or extends declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// `{% override "page.html" %}`
    Literal(String),
    /// `{% override layout %}`, evaluated when the chain is walked
    Deferred(VarPath),
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParentRef::Literal(name) => write!(f, "\"{}\"", name),
            ParentRef::Deferred(path) => write!(f, "{}", path),
        }
    }
}

/// Root AST node - a complete template source
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Spanned<Node>>,
}

/// A single element of a template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text copied to the output
    Text(String),
    /// Variable output: `{{ user.name }}`
    Variable(VarPath),
    /// `{{ block.super }}`
    Super,
    /// Named fragment: `{% block name %}...{% endblock %}`
    Fragment(FragmentDecl),
    /// Redirect declaration: `{% override "name" %}`
    Redirect(ParentRef),
    /// Parent of a chain root: `{% extends "name" %}`
    Extends(ParentRef),
}

impl Node {
    /// Text is the only node allowed ahead of a leading redirect
    pub fn is_trivial(&self) -> bool {
        matches!(self, Node::Text(_))
    }
}

/// Fragment declaration with its body
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDecl {
    pub name: Spanned<String>,
    pub body: Vec<Spanned<Node>>,
}
