//! Token buffer with position-consistent insertion
//!
//! Inserting a token shifts the positions of everything after it on the same
//! line, so the buffer keeps reassembling to valid source text.

use super::tokenizer::untokenize;
use super::tokens::{Token, TokenKind};
use crate::util::span::{Position, Span};

/// Insertion failure. Both variants are programming errors in a rewrite
/// pass, not user errors.
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("multi line tokens are not supported")]
    MultiLineToken,
    #[error("insertion index {index} out of range for buffer of {len} tokens")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A token to insert. Positional fields left `None` are inferred from the
/// predecessor token: start line from its end line (line 1 with no
/// predecessor), start column from its end column (0 with no predecessor),
/// end = start + text length, source line copied over.
#[derive(Debug, Clone)]
pub struct TokenDraft {
    pub kind: TokenKind,
    pub text: String,
    pub start_line: Option<usize>,
    pub start_col: Option<usize>,
    pub end_line: Option<usize>,
    pub end_col: Option<usize>,
    pub source_line: Option<String>,
}

impl TokenDraft {
    /// A draft with every positional field inferred.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            start_line: None,
            start_col: None,
            end_line: None,
            end_col: None,
            source_line: None,
        }
    }
}

/// Ordered, mutable token sequence. Exclusively owned by the pass currently
/// rewriting it.
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Reassemble the buffer into source text.
    pub fn text(&self) -> String {
        untokenize(&self.tokens)
    }

    /// Insert `draft` at `index`, shifting the positions of the tokens after
    /// it so the buffer still reassembles cleanly.
    ///
    /// With `padding`, one blank column is reserved on each side of the
    /// inserted token: its effective width becomes text length + 2 and it is
    /// placed one column further right.
    pub fn insert(
        &mut self,
        index: usize,
        draft: TokenDraft,
        padding: bool,
    ) -> Result<(), InsertError> {
        if index > self.tokens.len() {
            return Err(InsertError::IndexOutOfRange {
                index,
                len: self.tokens.len(),
            });
        }
        if draft.text.contains('\n') {
            return Err(InsertError::MultiLineToken);
        }

        let prev = index.checked_sub(1).and_then(|i| self.tokens.get(i));

        let start_line = draft
            .start_line
            .unwrap_or_else(|| prev.map_or(1, |p| p.span.end.line));
        let start_col = draft
            .start_col
            .unwrap_or_else(|| prev.map_or(0, |p| p.span.end.col));
        let end_line = draft.end_line.unwrap_or(start_line);
        let end_col = draft
            .end_col
            .unwrap_or_else(|| start_col + draft.text.chars().count());
        let source_line = draft
            .source_line
            .or_else(|| prev.map(|p| p.source_line.clone()))
            .unwrap_or_default();

        if start_line != end_line {
            return Err(InsertError::MultiLineToken);
        }

        let mut token = Token::new(
            draft.kind,
            draft.text,
            Span::new(
                Position::new(start_line, start_col),
                Position::new(end_line, end_col),
            ),
            source_line,
        );

        let mut length = end_col.saturating_sub(start_col);
        if padding {
            length += 2;
            // one blank column to the left, one to the right
            token.span.start.col += 1;
            token.span.end.col += 2;
        }

        self.shift(index, token.span.start.line, length);
        self.tokens.insert(index, token);
        Ok(())
    }

    /// Shift every token from `index` on that lies on `line` right by
    /// `amount` columns. A token that starts on `line` but ends on a later
    /// line has only its start adjusted; tokens starting on other lines are
    /// untouched.
    fn shift(&mut self, index: usize, line: usize, amount: usize) {
        for tok in self.tokens[index..].iter_mut() {
            if tok.span.start.line != line {
                break;
            }
            tok.span.start.col += amount;
            if tok.span.end.line == line {
                tok.span.end.col += amount;
            } else {
                break;
            }
        }
    }
}
