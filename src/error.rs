//! Error types for parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// 1-based line and column of a byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Compute the position of `offset` in `source`
    pub fn of(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("syntax error at {position}: {message}")]
    Syntax {
        span: Span,
        position: Position,
        message: String,
        expected: Vec<String>,
    },

    #[error("invalid root element <{found}> at {position}: documents must start with <mjml>")]
    InvalidRoot {
        found: String,
        span: Span,
        position: Position,
    },

    #[error("limit exceeded at {position}: {message}")]
    Limit {
        span: Span,
        position: Position,
        message: String,
    },
}

impl ParseError {
    pub(crate) fn syntax(source: &str, span: Span, message: impl Into<String>) -> Self {
        Self::Syntax {
            position: Position::of(source, span.start),
            span,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    pub(crate) fn limit(source: &str, span: Span, message: impl Into<String>) -> Self {
        Self::Limit {
            position: Position::of(source, span.start),
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::InvalidRoot { span, .. }
            | ParseError::Limit { span, .. } => span,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::Syntax { position, .. }
            | ParseError::InvalidRoot { position, .. }
            | ParseError::Limit { position, .. } => *position,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let (message, label) = match self {
            ParseError::Syntax {
                message, expected, ..
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (message.clone(), format!("{}{}", message, expected_str))
            }
            ParseError::InvalidRoot { found, .. } => (
                "invalid root element".to_string(),
                format!("expected <mjml>, found <{}>", found),
            ),
            ParseError::Limit { message, .. } => (message.clone(), message.clone()),
        };

        let span = self.span().clone();
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }

    pub(crate) fn from_rich(err: chumsky::error::Rich<'_, crate::parser::lexer::Token>, source: &str) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        let span = err.span().into_range();
        ParseError::Syntax {
            position: Position::of(source, span.start),
            span,
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::OpenTag(name) => format!("'<{}'", name),
        Token::CloseTag(name) => format!("'</{}'", name),
        Token::Name(name) => format!("attribute '{}'", name),
        Token::Equals => "'='".to_string(),
        Token::Value(v) => format!("value \"{}\"", v),
        Token::TagEnd => "'>'".to_string(),
        Token::SelfClose => "'/>'".to_string(),
        Token::Text(t) => format!("text \"{}\"", t.trim()),
        Token::Raw(_) => "raw content".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_of_offset() {
        let source = "<mjml>\n  <mj-body>\n</mjml>";
        assert_eq!(Position::of(source, 0), Position { line: 1, column: 1 });
        assert_eq!(Position::of(source, 9), Position { line: 2, column: 3 });
        assert_eq!(Position::of(source, 999), Position { line: 3, column: 8 });
    }

    #[test]
    fn test_format_includes_message() {
        let source = "<mjml><mj-body></mjml>";
        let err = ParseError::syntax(source, 15..21, "mismatched closing tag");
        let report = err.format(source, "email.mjml");
        assert!(report.contains("mismatched closing tag"));
        assert!(report.contains("email.mjml"));
    }

    #[test]
    fn test_display_carries_position() {
        let err = ParseError::syntax("a\nbc", 3..4, "boom");
        assert_eq!(err.to_string(), "syntax error at line 2, column 2: boom");
    }
}
