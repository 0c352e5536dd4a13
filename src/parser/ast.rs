//! Abstract syntax tree types
//!
//! A closed set of node variants; the tree rewriters are written as plain
//! `match`es over these, one rewrite function per pass.

use crate::util::span::Span;

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Int(i128),
    Float(f64),
    Bool(bool),
}

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Constructors of the symbolic-algebra collaborator that rewritten trees
/// call into. The closed-enum replacement for spelling the calls out as
/// attribute references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicKind {
    /// Wrap an integer literal in an exact symbolic integer
    WrapInteger,
    /// Build an equation from two operands
    Equation,
    /// Build an inequation from two operands
    Inequation,
}

/// Keyword argument in a call
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Expr,
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Lit, Span),
    /// A name read from the namespace. Assignment and deletion targets are
    /// plain strings on their statements, so every `Name` node is a read.
    Name {
        id: String,
        span: Span,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// Possibly chained comparison: `left ops[0] comparators[0] ops[1] ...`
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
        span: Span,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
        span: Span,
    },
    Tuple {
        elts: Vec<Expr>,
        span: Span,
    },
    /// Call into the symbolic-algebra collaborator; only ever created by
    /// the tree rewriter, never by the parser.
    Intrinsic {
        kind: IntrinsicKind,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span)
            | Expr::Name { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::BinOp { span, .. }
            | Expr::Compare { span, .. }
            | Expr::Call { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::Intrinsic { span, .. } => *span,
        }
    }

    fn span_mut(&mut self) -> &mut Span {
        match self {
            Expr::Literal(_, span)
            | Expr::Name { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::BinOp { span, .. }
            | Expr::Compare { span, .. }
            | Expr::Call { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::Intrinsic { span, .. } => span,
        }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign {
        target: String,
        value: Expr,
        span: Span,
    },
    Delete {
        names: Vec<String>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(expr) => expr.span(),
            Stmt::Assign { span, .. } | Stmt::Delete { span, .. } => *span,
        }
    }
}

/// A parsed submission
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// Make every span in the tree derivable again after rewriting: nodes the
/// rewriters synthesized carry dummy spans, which are filled in from their
/// children, or from the nearest enclosing node when no child has one.
pub fn fix_spans(module: &mut Module) {
    for stmt in &mut module.body {
        match stmt {
            Stmt::Expr(expr) => {
                fix_expr(expr, Span::dummy());
            }
            Stmt::Assign { value, span, .. } => {
                let fixed = fix_expr(value, *span);
                if span.is_dummy() {
                    *span = fixed;
                }
            }
            Stmt::Delete { .. } => {}
        }
    }
}

fn fix_expr(expr: &mut Expr, inherited: Span) -> Span {
    let current = if expr.span().is_dummy() {
        inherited
    } else {
        expr.span()
    };

    let derived = match expr {
        Expr::Literal(..) | Expr::Name { .. } => Span::dummy(),
        Expr::UnaryOp { operand, .. } => fix_expr(operand, current),
        Expr::BinOp { left, right, .. } => {
            fix_expr(left, current).merge(fix_expr(right, current))
        }
        Expr::Compare {
            left, comparators, ..
        } => {
            let mut all = fix_expr(left, current);
            for comparator in comparators {
                all = all.merge(fix_expr(comparator, current));
            }
            all
        }
        Expr::Call {
            func,
            args,
            keywords,
            ..
        } => {
            let mut all = fix_expr(func, current);
            for arg in args {
                all = all.merge(fix_expr(arg, current));
            }
            for keyword in keywords {
                all = all.merge(fix_expr(&mut keyword.value, current));
            }
            all
        }
        Expr::Tuple { elts, .. } | Expr::Intrinsic { args: elts, .. } => {
            let mut all = Span::dummy();
            for elt in elts {
                all = all.merge(fix_expr(elt, current));
            }
            all
        }
    };

    if expr.span().is_dummy() {
        let fixed = if derived.is_dummy() { current } else { derived };
        *expr.span_mut() = fixed;
    }
    expr.span()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::span::Position;

    fn spanned(start: usize, end: usize) -> Span {
        Span::new(Position::new(1, start), Position::new(1, end))
    }

    #[test]
    fn test_fix_spans_fills_synthesized_nodes() {
        // `5` wrapped by a rewriter: the wrapper has no span of its own
        let mut module = Module {
            body: vec![Stmt::Expr(Expr::Intrinsic {
                kind: IntrinsicKind::WrapInteger,
                args: vec![Expr::Literal(Lit::Int(5), spanned(0, 1))],
                span: Span::dummy(),
            })],
        };
        fix_spans(&mut module);
        assert_eq!(module.body[0].span(), spanned(0, 1));
    }

    #[test]
    fn test_fix_spans_inherits_when_no_child_has_one() {
        let mut module = Module {
            body: vec![Stmt::Assign {
                target: "x".into(),
                value: Expr::Name {
                    id: "y".into(),
                    span: Span::dummy(),
                },
                span: spanned(0, 5),
            }],
        };
        fix_spans(&mut module);
        let Stmt::Assign { value, .. } = &module.body[0] else {
            unreachable!()
        };
        assert_eq!(value.span(), spanned(0, 5));
    }
}
