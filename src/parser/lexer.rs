//! Lexer for the template language using logos
//!
//! Lexing happens in two passes. [`Segment`] splits the source into text and
//! delimited regions, then the inside of each `{% ... %}` tag is split into
//! [`Word`]s. The parser only ever sees [`Token`]s.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Top-level pieces of template source
#[derive(Logos, Debug, Clone, PartialEq)]
enum Segment {
    // Runs to the first `%}`; a `%` elsewhere belongs to the tag
    #[regex(r"\{%([^%]|%+[^%}])*%+\}", |lex| strip_delimiters(lex.slice()))]
    Tag(String),

    #[regex(r"\{\{[^}]*\}\}", |lex| strip_delimiters(lex.slice()))]
    Output(String),

    #[regex(r"\{#([^#]|#+[^#}])*#+\}", logos::skip)]
    Comment,

    // A lone brace that opens no delimiter is plain text
    #[regex(r"[^{]+", |lex| lex.slice().to_string())]
    #[token("{", |lex| lex.slice().to_string())]
    Text(String),
}

/// Words inside a `{% ... %}` tag
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Word {
    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    Quoted(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.]*", |lex| lex.slice().to_string())]
    Bare(String),
}

/// A parsed `{% keyword args... %}` tag
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub keyword: String,
    pub args: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text, adjacent pieces merged
    Text(String),
    /// Raw expression of a `{{ ... }}` output
    Output(String),
    /// A well-formed tag
    Tag(Tag),
    /// A tag whose contents could not be split into words
    Malformed(String),
}

fn strip_delimiters(slice: &str) -> String {
    slice[2..slice.len() - 2].trim().to_string()
}

fn unquote(slice: &str) -> String {
    slice[1..slice.len() - 1].to_string()
}

fn tag_token(content: &str) -> Token {
    let mut words = Vec::new();
    for word in Word::lexer(content) {
        match word {
            Ok(word) => words.push(word),
            Err(()) => return Token::Malformed(content.to_string()),
        }
    }

    match words.split_first() {
        Some((Word::Bare(keyword), args)) => Token::Tag(Tag {
            keyword: keyword.clone(),
            args: args.to_vec(),
        }),
        _ => Token::Malformed(content.to_string()),
    }
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut tokens: Vec<(Token, Span)> = Vec::new();

    for (segment, span) in Segment::lexer(input).spanned() {
        let token = match segment {
            Ok(Segment::Text(text)) => {
                if let Some((Token::Text(prev), prev_span)) = tokens.last_mut() {
                    prev.push_str(&text);
                    prev_span.end = span.end;
                    continue;
                }
                Token::Text(text)
            }
            Ok(Segment::Output(expr)) => Token::Output(expr),
            Ok(Segment::Tag(content)) => tag_token(&content),
            Ok(Segment::Comment) => continue,
            Err(()) => Token::Malformed(input[span.clone()].to_string()),
        };
        tokens.push((token, span));
    }

    tokens
}
