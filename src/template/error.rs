//! Errors raised while resolving an override chain

use thiserror::Error;

use crate::parser::ast::Span;
use crate::ParseError;

/// Structural problems found while extracting a chain link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("'override' cannot appear more than once in the same template")]
    DuplicateRedirect,

    #[error("'override' must be the first tag in the template")]
    MisplacedRedirect,

    #[error("fragment '{0}' is declared more than once")]
    DuplicateFragment(String),

    #[error("'extends' cannot appear more than once in the same template")]
    DuplicateExtends,

    #[error("'extends' must be the first tag in the template")]
    MisplacedExtends,

    #[error("a template cannot both 'override' and 'extend' another")]
    OverrideWithExtends,
}

/// Errors that terminate a resolution
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No provider has a definition of the name
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// An override asked for a layer that no provider supplies
    #[error("cannot find override layer {depth} of template '{name}'")]
    MissingOverrideTarget { name: String, depth: usize },

    /// A link redirects to a different name than the chain is resolving
    #[error("'{origin}' overrides '{found}' but the chain is resolving '{expected}'")]
    DivergentChain {
        expected: String,
        found: String,
        origin: String,
    },

    /// Malformed redirect or fragment declarations
    #[error("invalid template '{origin}': {violation}")]
    StructuralViolation {
        origin: String,
        violation: Violation,
        span: Span,
    },

    /// An override or extends target did not evaluate to a usable name
    #[error("invalid template target in '{origin}': {reason} (from '{expression}')")]
    InvalidTarget {
        origin: String,
        expression: String,
        reason: String,
    },

    /// A chain root extends a template that is already part of the resolution
    #[error("'{origin}' extends '{name}', which is already being resolved")]
    CircularExtends { name: String, origin: String },

    /// Template source failed to parse
    #[error("parse errors in '{origin}': {}", format_parse_errors(.errors))]
    Parse {
        origin: String,
        content: String,
        errors: Vec<ParseError>,
    },
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ResolutionError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn missing_override_target(name: impl Into<String>, depth: usize) -> Self {
        Self::MissingOverrideTarget {
            name: name.into(),
            depth,
        }
    }

    pub fn divergent(
        expected: impl Into<String>,
        found: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self::DivergentChain {
            expected: expected.into(),
            found: found.into(),
            origin: origin.into(),
        }
    }

    pub fn structural(origin: impl Into<String>, violation: Violation, span: Span) -> Self {
        Self::StructuralViolation {
            origin: origin.into(),
            violation,
            span,
        }
    }

    /// Get the source span if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::StructuralViolation { span, .. } => Some(span),
            Self::Parse { errors, .. } => errors.first().map(|e| e.span()),
            _ => None,
        }
    }

    /// Render parse errors with source context, falling back to the message
    pub fn report(&self) -> String {
        match self {
            Self::Parse {
                origin,
                content,
                errors,
            } => errors
                .iter()
                .map(|e| e.format(content, origin))
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ResolutionError::not_found("page.html");
        assert_eq!(err.to_string(), "template not found: page.html");
    }

    #[test]
    fn test_missing_override_target_display() {
        let err = ResolutionError::missing_override_target("page.html", 3);
        assert!(err.to_string().contains("layer 3"));
        assert!(err.to_string().contains("page.html"));
    }

    #[test]
    fn test_divergent_display() {
        let err = ResolutionError::divergent("page.html", "other.html", "b1/page.html");
        assert_eq!(
            err.to_string(),
            "'b1/page.html' overrides 'other.html' but the chain is resolving 'page.html'"
        );
    }

    #[test]
    fn test_structural_span() {
        let err = ResolutionError::structural("a/page.html", Violation::DuplicateRedirect, 4..10);
        assert_eq!(err.span(), Some(&(4..10)));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_report_falls_back_to_message() {
        let err = ResolutionError::not_found("page.html");
        assert_eq!(err.report(), err.to_string());
    }

    #[test]
    fn test_parse_error_report_shows_origin() {
        let content = "{% block a %}unclosed";
        let errors = crate::parser::parse(content).expect_err("Should fail");
        let err = ResolutionError::Parse {
            origin: "site/page.html".to_string(),
            content: content.to_string(),
            errors,
        };
        assert!(err.to_string().starts_with("parse errors in 'site/page.html'"));
        assert!(err.report().contains("site/page.html"));
        assert!(err.span().is_some());
    }
}
