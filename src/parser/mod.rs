//! Parser
//!
//! Precedence-climbing parser from the token stream into [`ast`] nodes.
//! Parse failure aborts the whole cycle before anything executes.

pub mod ast;

use crate::lexer::{is_keyword, tokenize, Token, TokenKind};
use crate::util::span::{Position, Span};

use ast::{BinOp, CmpOp, Expr, Keyword, Lit, Module, Stmt, UnOp};

/// Parse failure
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token '{text}' at {position}")]
    UnexpectedToken { text: String, position: Position },
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid number literal '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },
    #[error("expected {expected} at {position}, found '{found}'")]
    Expected {
        expected: &'static str,
        found: String,
        position: Position,
    },
}

/// Parse one submission into a module.
pub fn parse(source: &str) -> Result<Module, ParseError> {
    let tokens = significant(tokenize(source))?;
    Parser { tokens, pos: 0 }.parse_module()
}

/// Drop the tokens the grammar does not care about: indentation bookkeeping,
/// the end marker, and comments. String literals and stray characters are
/// rejected here, before any statement is looked at.
fn significant(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let mut result = Vec::with_capacity(tokens.len());
    for tok in tokens {
        match tok.kind {
            TokenKind::Number
            | TokenKind::Identifier
            | TokenKind::Operator
            | TokenKind::Delimiter
            | TokenKind::Newline => result.push(tok),
            TokenKind::Indent | TokenKind::Dedent | TokenKind::EndMarker => {}
            TokenKind::Other => {
                if !tok.text.starts_with('#') {
                    return Err(ParseError::UnexpectedToken {
                        text: tok.text,
                        position: tok.span.start,
                    });
                }
            }
        }
    }
    Ok(result)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn nth_is(&self, n: usize, kind: TokenKind, text: &str) -> bool {
        self.tokens
            .get(self.pos + n)
            .is_some_and(|t| t.kind == kind && t.text == text)
    }

    fn check(&self, kind: TokenKind, text: &str) -> bool {
        self.nth_is(0, kind, text)
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(tok)
    }

    fn eat(&mut self, kind: TokenKind, text: &str) -> bool {
        if self.check(kind, text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, text: &str, label: &'static str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(tok) if tok.kind == kind && tok.text == text => self.bump(),
            Some(tok) => Err(ParseError::Expected {
                expected: label,
                found: tok.text.clone(),
                position: tok.span.start,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// A plain, non-reserved name.
    fn expect_name(&mut self) -> Result<Token, ParseError> {
        match self.peek() {
            Some(tok) if tok.kind == TokenKind::Identifier && !is_keyword(&tok.text) => self.bump(),
            Some(tok) => Err(ParseError::Expected {
                expected: "a name",
                found: tok.text.clone(),
                position: tok.span.start,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn is_separator(tok: &Token) -> bool {
        tok.kind == TokenKind::Newline || (tok.kind == TokenKind::Delimiter && tok.text == ";")
    }

    fn skip_separators(&mut self) {
        while self.peek().is_some_and(Self::is_separator) {
            self.pos += 1;
        }
    }

    fn parse_module(mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        self.skip_separators();
        while self.peek().is_some() {
            body.push(self.parse_stmt()?);
            match self.peek() {
                None => break,
                Some(tok) if Self::is_separator(tok) => self.skip_separators(),
                Some(tok) => {
                    return Err(ParseError::Expected {
                        expected: "end of statement",
                        found: tok.text.clone(),
                        position: tok.span.start,
                    })
                }
            }
        }
        Ok(Module { body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.check(TokenKind::Identifier, "del") {
            let start = self.bump()?.span;
            let mut names = Vec::new();
            let mut end = start;
            loop {
                let tok = self.expect_name()?;
                end = tok.span;
                names.push(tok.text);
                if !self.eat(TokenKind::Delimiter, ",") {
                    break;
                }
            }
            return Ok(Stmt::Delete {
                names,
                span: start.merge(end),
            });
        }

        let is_assignment = self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Identifier && !is_keyword(&t.text))
            && self.nth_is(1, TokenKind::Operator, "=");
        if is_assignment {
            let name = self.bump()?;
            self.bump()?; // '='
            let value = self.parse_expr_tuple()?;
            let span = name.span.merge(value.span());
            return Ok(Stmt::Assign {
                target: name.text,
                value,
                span,
            });
        }

        Ok(Stmt::Expr(self.parse_expr_tuple()?))
    }

    /// Expression with top-level commas: `a, b, c` is a tuple.
    fn parse_expr_tuple(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_expr()?;
        if !self.check(TokenKind::Delimiter, ",") {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(TokenKind::Delimiter, ",") {
            if self.tuple_end() {
                break;
            }
            elts.push(self.parse_expr()?);
        }
        let span = elts
            .iter()
            .fold(Span::dummy(), |acc, e| acc.merge(e.span()));
        Ok(Expr::Tuple { elts, span })
    }

    fn tuple_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(tok) => Self::is_separator(tok) || (tok.kind == TokenKind::Delimiter && tok.text == ")"),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_comparison()
    }

    fn cmp_op(&self) -> Option<CmpOp> {
        let tok = self.peek()?;
        if tok.kind != TokenKind::Operator {
            return None;
        }
        match tok.text.as_str() {
            "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            "<" => Some(CmpOp::Lt),
            "<=" => Some(CmpOp::Le),
            ">" => Some(CmpOp::Gt),
            ">=" => Some(CmpOp::Ge),
            _ => None,
        }
    }

    /// Comparisons chain the way they do in the source language:
    /// `a < b < c` is a single node with two operators.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_arith()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.cmp_op() {
            self.bump()?;
            ops.push(op);
            comparators.push(self.parse_arith()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        let span = comparators
            .iter()
            .fold(left.span(), |acc, c| acc.merge(c.span()));
        Ok(Expr::Compare {
            left: Box::new(left),
            ops,
            comparators,
            span,
        })
    }

    fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(tok) if tok.kind == TokenKind::Operator && tok.text == "+" => BinOp::Add,
                Some(tok) if tok.kind == TokenKind::Operator && tok.text == "-" => BinOp::Sub,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_term()?;
            let span = left.span().merge(right.span());
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Some(tok) if tok.kind == TokenKind::Operator && tok.text == "*" => BinOp::Mul,
                Some(tok) if tok.kind == TokenKind::Operator && tok.text == "/" => BinOp::Div,
                Some(tok) if tok.kind == TokenKind::Operator && tok.text == "%" => BinOp::Mod,
                _ => break,
            };
            self.bump()?;
            let right = self.parse_factor()?;
            let span = left.span().merge(right.span());
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(tok) if tok.kind == TokenKind::Operator && tok.text == "-" => Some(UnOp::Neg),
            Some(tok) if tok.kind == TokenKind::Operator && tok.text == "+" => Some(UnOp::Pos),
            _ => None,
        };
        if let Some(op) = op {
            let tok = self.bump()?;
            let operand = self.parse_factor()?;
            let span = tok.span.merge(operand.span());
            return Ok(Expr::UnaryOp {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if self.eat(TokenKind::Operator, "**") {
            // right associative; the exponent may carry a sign
            let exponent = self.parse_factor()?;
            let span = base.span().merge(exponent.span());
            return Ok(Expr::BinOp {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
                span,
            });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;
        while self.check(TokenKind::Delimiter, "(") {
            self.bump()?;
            let mut args = Vec::new();
            let mut keywords = Vec::new();
            if !self.check(TokenKind::Delimiter, ")") {
                loop {
                    let is_keyword_arg = self
                        .peek()
                        .is_some_and(|t| t.kind == TokenKind::Identifier && !is_keyword(&t.text))
                        && self.nth_is(1, TokenKind::Operator, "=");
                    if is_keyword_arg {
                        let name = self.bump()?;
                        self.bump()?; // '='
                        let value = self.parse_expr()?;
                        keywords.push(Keyword {
                            name: name.text,
                            value,
                        });
                    } else {
                        args.push(self.parse_expr()?);
                    }
                    if !self.eat(TokenKind::Delimiter, ",") {
                        break;
                    }
                    if self.check(TokenKind::Delimiter, ")") {
                        break;
                    }
                }
            }
            let close = self.expect(TokenKind::Delimiter, ")", "')'")?;
            let span = expr.span().merge(close.span);
            expr = Expr::Call {
                func: Box::new(expr),
                args,
                keywords,
                span,
            };
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let Some(tok) = self.peek().cloned() else {
            return Err(ParseError::UnexpectedEof);
        };
        match tok.kind {
            TokenKind::Number => {
                self.bump()?;
                let lit = parse_number(&tok)?;
                Ok(Expr::Literal(lit, tok.span))
            }
            TokenKind::Identifier => {
                if tok.text == "true" || tok.text == "false" {
                    self.bump()?;
                    return Ok(Expr::Literal(Lit::Bool(tok.text == "true"), tok.span));
                }
                if is_keyword(&tok.text) {
                    return Err(ParseError::UnexpectedToken {
                        text: tok.text,
                        position: tok.span.start,
                    });
                }
                self.bump()?;
                Ok(Expr::Name {
                    id: tok.text,
                    span: tok.span,
                })
            }
            TokenKind::Delimiter if tok.text == "(" => {
                self.bump()?;
                let inner = self.parse_expr_tuple()?;
                self.expect(TokenKind::Delimiter, ")", "')'")?;
                Ok(inner)
            }
            _ => Err(ParseError::UnexpectedToken {
                text: tok.text,
                position: tok.span.start,
            }),
        }
    }
}

fn parse_number(tok: &Token) -> Result<Lit, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        text: tok.text.clone(),
        position: tok.span.start,
    };
    if tok.text.contains(['.', 'e', 'E']) {
        tok.text.parse::<f64>().map(Lit::Float).map_err(|_| invalid())
    } else {
        tok.text.parse::<i128>().map(Lit::Int).map_err(|_| invalid())
    }
}
