//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{Tag, Token, Word};

/// Parse template source into an AST
pub fn parse(input: &str) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input)
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let node = recursive(|node| {
        let text = select! {
            Token::Text(s) => Node::Text(s),
        };

        let output = select! {
            Token::Output(expr) => expr,
        }
        .try_map(|expr, span: SimpleSpan| match VarPath::parse(&expr) {
            Some(path) if path.is_super() => Ok(Node::Super),
            Some(path) => Ok(Node::Variable(path)),
            None => Err(Rich::custom(
                span,
                format!("'{}' is not a valid variable path", expr),
            )),
        });

        // `{% override "name" %}` or `{% override variable %}`
        let redirect = select! {
            Token::Tag(tag) if tag.keyword == "override" => tag,
        }
        .try_map(|tag: Tag, span: SimpleSpan| parent_ref(&tag, span).map(Node::Redirect));

        // `{% extends "name" %}` or `{% extends variable %}`
        let extends = select! {
            Token::Tag(tag) if tag.keyword == "extends" => tag,
        }
        .try_map(|tag: Tag, span: SimpleSpan| parent_ref(&tag, span).map(Node::Extends));

        let block_open = select! {
            Token::Tag(tag) if tag.keyword == "block" => tag,
        }
        .try_map(|tag: Tag, span: SimpleSpan| match tag.args.as_slice() {
            [Word::Bare(name)] => Ok(Spanned::new(name.clone(), span_range(&span))),
            _ => Err(Rich::custom(span, "'block' takes one argument")),
        });

        let block_close = select! {
            Token::Tag(tag) if tag.keyword == "endblock" => tag,
        }
        .try_map(|tag: Tag, span: SimpleSpan| match tag.args.as_slice() {
            [] => Ok(None),
            [Word::Bare(name)] => Ok(Some(name.clone())),
            _ => Err(Rich::custom(span, "'endblock' takes at most one argument")),
        });

        let fragment = block_open
            .then(node.repeated().collect::<Vec<_>>())
            .then(block_close)
            .try_map(|((name, body), close), span: SimpleSpan| {
                if let Some(close) = close {
                    if close != name.node {
                        return Err(Rich::custom(
                            span,
                            format!(
                                "'endblock {}' does not close block '{}'",
                                close, name.node
                            ),
                        ));
                    }
                }
                Ok(Node::Fragment(FragmentDecl { name, body }))
            });

        choice((text, output, redirect, extends, fragment))
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
            .boxed()
    });

    node.repeated()
        .collect()
        .then_ignore(end())
        .map(|nodes| Document { nodes })
}

/// The single name argument of `override` and `extends`
fn parent_ref<'a>(tag: &Tag, span: SimpleSpan) -> Result<ParentRef, Rich<'a, Token>> {
    match tag.args.as_slice() {
        [Word::Quoted(name)] => Ok(ParentRef::Literal(name.clone())),
        [Word::Bare(expr)] => VarPath::parse(expr).map(ParentRef::Deferred).ok_or_else(|| {
            Rich::custom(span, format!("'{}' is not a valid variable path", expr))
        }),
        _ => Err(Rich::custom(
            span,
            format!("'{}' takes one argument", tag.keyword),
        )),
    }
}
