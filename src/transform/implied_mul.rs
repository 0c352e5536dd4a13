//! Implied multiplication
//!
//! Turns juxtaposed operands into explicit products at the lexical level:
//! `2x` becomes `2 * x`, `(a)(b)` becomes `(a) * (b)`. Runs before parsing,
//! so the grammar itself never has to know about juxtaposition.

use tracing::warn;

use super::LineRewrite;
use crate::lexer::{is_keyword, tokenize, Token, TokenBuffer, TokenDraft, TokenKind};

/// A token that can stand on either side of an implied product.
fn operand_like(tok: &Token) -> bool {
    match tok.kind {
        TokenKind::Number => true,
        TokenKind::Identifier => !is_keyword(&tok.text),
        _ => false,
    }
}

fn is_delim(tok: &Token, text: &str) -> bool {
    tok.kind == TokenKind::Delimiter && tok.text == text
}

/// Whether a `*` belongs between this adjacent pair. An identifier followed
/// by `(` is a call, never a product; `)` followed by `(` always is one.
fn wants_operator(prev: &Token, cur: &Token) -> bool {
    let after_group = is_delim(prev, ")");
    (operand_like(cur) && (operand_like(prev) || after_group))
        || (after_group && is_delim(cur, "("))
}

/// The juxtaposition pass. Stateless; idempotent on its own output.
#[derive(Debug, Default)]
pub struct ImpliedMultiplication;

impl LineRewrite for ImpliedMultiplication {
    fn rewrite_line(&mut self, line: &str) -> String {
        let mut buf = TokenBuffer::new(tokenize(line));
        // every insertion invalidates the indices, so scan from the top
        // after each one
        'scan: loop {
            for i in 1..buf.len() {
                let tokens = buf.tokens();
                if wants_operator(&tokens[i - 1], &tokens[i]) {
                    let draft = TokenDraft::new(TokenKind::Operator, "*");
                    if let Err(err) = buf.insert(i, draft, true) {
                        warn!(%err, line, "could not insert implied operator, leaving line as is");
                        return line.to_string();
                    }
                    continue 'scan;
                }
            }
            break;
        }
        buf.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(line: &str) -> String {
        ImpliedMultiplication.rewrite_line(line)
    }

    #[test]
    fn test_number_identifier() {
        assert_eq!(rewrite("2x"), "2 * x");
        assert_eq!(rewrite("2 x"), "2 *  x");
    }

    #[test]
    fn test_runs_of_operands() {
        assert_eq!(rewrite("2 x y"), "2 *  x *  y");
    }

    #[test]
    fn test_group_pairs() {
        assert_eq!(rewrite("(a)(b)"), "(a) * (b)");
        assert_eq!(rewrite("(a)b"), "(a) * b");
    }

    #[test]
    fn test_calls_untouched() {
        assert_eq!(rewrite("sin(x)"), "sin(x)");
        assert_eq!(rewrite("f(a, b)"), "f(a, b)");
    }

    #[test]
    fn test_keywords_are_not_operands() {
        assert_eq!(rewrite("a and b"), "a and b");
        assert_eq!(rewrite("del x"), "del x");
    }

    #[test]
    fn test_explicit_operators_untouched() {
        assert_eq!(rewrite("2 * x + 3"), "2 * x + 3");
        assert_eq!(rewrite("a**b"), "a**b");
    }

    #[test]
    fn test_idempotent() {
        let once = rewrite("2x + 3y(z)");
        assert_eq!(rewrite(&once), once);
    }

    #[test]
    fn test_empty_and_plain_lines() {
        assert_eq!(rewrite(""), "");
        assert_eq!(rewrite("x = 1"), "x = 1");
    }

    #[test]
    fn test_multiple_lines_via_rewrite_lines() {
        assert_eq!(
            ImpliedMultiplication.rewrite_lines("2x\n3 y"),
            "2 * x\n3 *  y"
        );
    }
}
