//! Template syntax errors

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::error::{Rich, RichPattern, RichReason};
use thiserror::Error;

use crate::parser::lexer::{Span, Token};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The parser hit a token (or the end of input) it could not use
    #[error("unexpected {found} at {}..{}", .span.start, .span.end)]
    Unexpected {
        span: Span,
        found: String,
        expected: Vec<String>,
    },

    /// A tag or output was recognised but its contents are invalid
    #[error("{message} at {}..{}", .span.start, .span.end)]
    Invalid { span: Span, message: String },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            Self::Unexpected { span, .. } | Self::Invalid { span, .. } => span,
        }
    }

    /// Render the error against its template source with ariadne
    pub fn format(&self, source: &str, origin: &str) -> String {
        let span = self.span().clone();
        let (label, note) = match self {
            Self::Unexpected {
                found, expected, ..
            } => (
                format!("unexpected {}", found),
                (!expected.is_empty()).then(|| format!("expected one of: {}", expected.join(", "))),
            ),
            Self::Invalid { message, .. } => (message.clone(), None),
        };

        let mut report = Report::build(ReportKind::Error, origin, span.start)
            .with_message("invalid template syntax")
            .with_label(
                Label::new((origin, span))
                    .with_message(label)
                    .with_color(Color::Red),
            );
        if let Some(note) = note {
            report = report.with_note(note);
        }

        let mut buf = Vec::new();
        match report.finish().write((origin, Source::from(source)), &mut buf) {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| self.to_string()),
            Err(_) => self.to_string(),
        }
    }
}

impl<'a> From<Rich<'a, Token>> for ParseError {
    fn from(err: Rich<'a, Token>) -> Self {
        let span = err.span().into_range();
        match err.reason() {
            RichReason::Custom(message) => ParseError::Invalid {
                span,
                message: message.to_string(),
            },
            RichReason::ExpectedFound { found, .. } => ParseError::Unexpected {
                span,
                found: found.as_deref().map_or_else(|| "end of template".to_string(), describe),
                expected: err
                    .expected()
                    .filter_map(|pattern| match pattern {
                        RichPattern::Token(tok) => Some(describe(tok)),
                        RichPattern::EndOfInput => Some("end of template".to_string()),
                        _ => None,
                    })
                    .collect(),
            },
            #[allow(unreachable_patterns)]
            other => ParseError::Invalid {
                span,
                message: format!("{:?}", other),
            },
        }
    }
}

/// Short human-readable description of a token
fn describe(tok: &Token) -> String {
    match tok {
        Token::Text(s) => format!("text \"{}\"", abbreviate(s)),
        Token::Output(expr) => format!("output '{{{{ {} }}}}'", expr),
        Token::Tag(tag) if tag.keyword == "endblock" => "'endblock' without an open block".to_string(),
        Token::Tag(tag) => format!("tag '{}'", tag.keyword),
        Token::Malformed(content) => format!("malformed tag '{{% {} %}}'", content),
    }
}

fn abbreviate(text: &str) -> String {
    const LIMIT: usize = 20;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_origin_and_note() {
        let err = ParseError::Unexpected {
            span: 0..13,
            found: "tag 'include'".to_string(),
            expected: vec!["end of template".to_string()],
        };
        let formatted = err.format("{% include %}", "page.html");
        assert!(formatted.contains("page.html"));
        assert!(formatted.contains("unexpected tag 'include'"));
        assert!(formatted.contains("end of template"));
    }

    #[test]
    fn test_display() {
        let err = ParseError::Invalid {
            span: 3..9,
            message: "'block' takes one argument".to_string(),
        };
        assert_eq!(err.to_string(), "'block' takes one argument at 3..9");
    }

    #[test]
    fn test_abbreviate_long_text() {
        assert_eq!(abbreviate("short"), "short");
        assert_eq!(abbreviate("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrst...");
    }

    #[test]
    fn test_unknown_tag_is_reported_at_its_start() {
        let errors = crate::parser::parse("ok {% include \"x\" %}").expect_err("Should fail");
        assert_eq!(errors[0].span().start, 3);
    }

    #[test]
    fn test_stray_endblock_is_described() {
        let errors = crate::parser::parse("{% endblock %}").expect_err("Should fail");
        assert!(errors[0].to_string().contains("'endblock' without an open block"));
    }
}
