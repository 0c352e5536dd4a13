//! Token types

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::util::span::Span;

/// Reserved words of the input language. They lex as [`TokenKind::Identifier`]
/// like any other name; keyword-ness is a predicate on the text, so passes
/// that only care about operand-shaped tokens can exclude them.
static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "or", "not", "del", "if", "elif", "else", "while", "for", "in", "true", "false",
    ]
    .into_iter()
    .collect()
});

/// Check whether `text` is a reserved word.
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(text)
}

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Integer or float literal
    Number,
    /// Name or reserved word
    Identifier,
    /// Arithmetic, comparison, or assignment operator
    Operator,
    /// Parentheses, brackets, braces, comma, semicolon, colon
    Delimiter,
    /// End of a physical line (`\n`)
    Newline,
    /// Leading whitespace of a line, text preserved exactly
    Indent,
    /// Zero-width marker emitted when a line's indentation shrinks
    Dedent,
    /// Zero-width marker closing the buffer
    EndMarker,
    /// Anything the language does not assign meaning to: string literals,
    /// comments, stray characters. Keeps the tokenizer total.
    Other,
}

/// A lexical unit with its source span and the line it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Full text of the source line this token came from, without the
    /// trailing newline.
    pub source_line: String,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            source_line: source_line.into(),
        }
    }

    /// Length of the token text in columns (characters).
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert!(is_keyword("del"));
        assert!(is_keyword("and"));
        assert!(is_keyword("true"));
        assert!(!is_keyword("x"));
        assert!(!is_keyword("sin"));
    }
}
