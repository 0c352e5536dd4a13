//! Tokenizer
//!
//! Total over arbitrary input: anything the language gives no meaning to
//! becomes an [`TokenKind::Other`] token instead of an error. The pair
//! [`tokenize`]/[`untokenize`] is lossless: reassembling a freshly produced
//! buffer reproduces the input byte for byte (leading whitespace is captured
//! exactly by `Indent` tokens, interior gaps are reconstructed from column
//! positions).

use unicode_ident::{is_xid_continue, is_xid_start};

use super::tokens::{Token, TokenKind};
use crate::util::span::{Position, Span};

fn span_at(line: usize, start_col: usize, end_col: usize) -> Span {
    Span::new(Position::new(line, start_col), Position::new(line, end_col))
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || is_xid_start(c)
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || is_xid_continue(c)
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Tokenize one submission. Never fails.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let lines: Vec<&str> = input.split('\n').collect();
    let last_index = lines.len() - 1;
    let mut prev_indent = 0usize;
    let mut end_pos = Position::new(1, 0);

    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        let chars: Vec<char> = line.chars().collect();
        let mut col = 0usize;

        // Leading whitespace becomes a single Indent token, text preserved
        // exactly so tabs survive the round-trip.
        while col < chars.len() && (chars[col] == ' ' || chars[col] == '\t') {
            col += 1;
        }
        if col > 0 {
            let text: String = chars[..col].iter().collect();
            tokens.push(Token::new(
                TokenKind::Indent,
                text,
                span_at(line_no, 0, col),
                *line,
            ));
        }

        // Blank lines do not participate in indentation tracking.
        if col < chars.len() {
            if col < prev_indent {
                tokens.push(Token::new(
                    TokenKind::Dedent,
                    "",
                    span_at(line_no, col, col),
                    *line,
                ));
            }
            prev_indent = col;
        }

        while col < chars.len() {
            if chars[col] == ' ' || chars[col] == '\t' {
                col += 1;
                continue;
            }
            let start = col;
            let (kind, len) = scan_token(&chars, col);
            col += len;
            let text: String = chars[start..col].iter().collect();
            tokens.push(Token::new(kind, text, span_at(line_no, start, col), *line));
        }

        if i < last_index {
            tokens.push(Token::new(
                TokenKind::Newline,
                "\n",
                span_at(line_no, col, col + 1),
                *line,
            ));
            end_pos = Position::new(line_no + 1, 0);
        } else {
            end_pos = Position::new(line_no, col);
        }
    }

    tokens.push(Token::new(
        TokenKind::EndMarker,
        "",
        Span::new(end_pos, end_pos),
        "",
    ));
    tokens
}

/// Classify the token starting at `chars[at]` and return its kind and
/// length in characters. `chars[at]` is guaranteed non-whitespace.
fn scan_token(chars: &[char], at: usize) -> (TokenKind, usize) {
    let c = chars[at];
    let next = chars.get(at + 1).copied();

    if is_digit(c) || (c == '.' && next.is_some_and(is_digit)) {
        return (TokenKind::Number, scan_number(chars, at));
    }
    if is_identifier_start(c) {
        let mut len = 1;
        while chars.get(at + len).copied().is_some_and(is_identifier_char) {
            len += 1;
        }
        return (TokenKind::Identifier, len);
    }
    match c {
        '*' if next == Some('*') => (TokenKind::Operator, 2),
        '=' if next == Some('=') => (TokenKind::Operator, 2),
        '!' if next == Some('=') => (TokenKind::Operator, 2),
        '<' if next == Some('=') => (TokenKind::Operator, 2),
        '>' if next == Some('=') => (TokenKind::Operator, 2),
        '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' => (TokenKind::Operator, 1),
        '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';' | ':' => (TokenKind::Delimiter, 1),
        '#' => (TokenKind::Other, chars.len() - at),
        '\'' | '"' => (TokenKind::Other, scan_string(chars, at, c)),
        _ => (TokenKind::Other, 1),
    }
}

fn scan_number(chars: &[char], at: usize) -> usize {
    let mut len = 0;
    while chars.get(at + len).copied().is_some_and(is_digit) {
        len += 1;
    }
    if chars.get(at + len) == Some(&'.') {
        len += 1;
        while chars.get(at + len).copied().is_some_and(is_digit) {
            len += 1;
        }
    }
    if matches!(chars.get(at + len), Some('e') | Some('E')) {
        let mut exp = 1;
        if matches!(chars.get(at + len + exp), Some('+') | Some('-')) {
            exp += 1;
        }
        if chars.get(at + len + exp).copied().is_some_and(is_digit) {
            len += exp;
            while chars.get(at + len).copied().is_some_and(is_digit) {
                len += 1;
            }
        }
    }
    len
}

fn scan_string(chars: &[char], at: usize, quote: char) -> usize {
    let mut len = 1;
    while let Some(&c) = chars.get(at + len) {
        len += 1;
        if c == '\\' && chars.get(at + len).is_some() {
            len += 1;
        } else if c == quote {
            return len;
        }
    }
    // Unterminated string: swallow the rest of the line.
    len
}

/// Reassemble a token buffer into source text.
///
/// Gaps between tokens on a line are filled with spaces computed from the
/// column positions; a token whose span is wider than its text (padded
/// insertion) therefore materializes its reserved blank columns.
pub fn untokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut line = 1usize;
    let mut col = 0usize;

    for tok in tokens {
        if tok.text.is_empty() {
            continue;
        }
        if tok.span.start.line > line {
            for _ in line..tok.span.start.line {
                out.push('\n');
            }
            line = tok.span.start.line;
            col = 0;
        }
        if tok.span.start.line == line && tok.span.start.col > col {
            for _ in col..tok.span.start.col {
                out.push(' ');
            }
        }
        out.push_str(&tok.text);
        let newlines = tok.text.matches('\n').count();
        if newlines > 0 {
            line = tok.span.start.line + newlines;
            col = 0;
        } else {
            col = tok.span.start.col + tok.width();
        }
    }
    out
}
