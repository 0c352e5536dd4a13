//! Syntax-tree rewriting
//!
//! One children-first pass over the parsed module that
//!   - wraps integer literals so execution sees exact integers,
//!   - promotes free identifiers to freshly minted symbols,
//!   - rewrites single `==`/`!=` comparisons touching a symbol into
//!     equation constructors,
//!   - and turns calls on non-callable targets into multiplication.
//!
//! The pass also owns the post-execute cleanup: symbols it minted are
//! removed from the namespace once the submission has run, so a typo does
//! not linger as a binding.

use tracing::{debug, warn};

use super::{RewriteContext, TreeRewrite};
use crate::engine::eval::{eval_expr, ExecError};
use crate::engine::namespace::Namespace;
use crate::engine::value::Value;
use crate::parser::ast::{BinOp, CmpOp, Expr, IntrinsicKind, Lit, Module, Stmt};
use crate::util::span::Span;

/// Swap an expression out of the tree, leaving an inert placeholder.
fn take_expr(slot: &mut Expr) -> Expr {
    std::mem::replace(slot, Expr::Literal(Lit::Bool(false), Span::dummy()))
}

/// Whether an operand resolves to a symbol in `ns`. The search only looks
/// through arithmetic and comparisons; a symbol buried in a tuple or a call
/// does not make the enclosing comparison an equation.
fn has_symbol(expr: &Expr, ns: &Namespace) -> bool {
    match expr {
        Expr::Name { id, .. } => ns.get(id).and_then(Value::as_symbol).is_some(),
        Expr::UnaryOp { operand, .. } => has_symbol(operand, ns),
        Expr::BinOp { left, right, .. } => has_symbol(left, ns) || has_symbol(right, ns),
        Expr::Compare {
            left, comparators, ..
        } => has_symbol(left, ns) || comparators.iter().any(|c| has_symbol(c, ns)),
        Expr::Literal(..) | Expr::Call { .. } | Expr::Tuple { .. } | Expr::Intrinsic { .. } => {
            false
        }
    }
}

/// The tree-rewriting pass, carrying the names it auto-created so the
/// cleanup hook can take them back out.
#[derive(Debug, Default)]
pub struct SymbolRewriter {
    pending: Vec<String>,
}

impl SymbolRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names minted during the current submission, in creation order.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Remove every auto-created symbol from the namespace. Runs after each
    /// submission, whether it succeeded or not. A name the submission itself
    /// rebound is no longer ours and stays.
    pub fn post_execute(&mut self, ns: &mut Namespace) {
        for name in self.pending.drain(..) {
            match ns.get(&name) {
                Some(value) if value.as_symbol() == Some(name.as_str()) => {
                    ns.remove(&name);
                    debug!(name = %name, "removed auto-created symbol");
                }
                Some(_) => debug!(name = %name, "auto-created name was rebound, keeping it"),
                None => warn!(name = %name, "auto-created symbol was already gone at cleanup"),
            }
        }
    }

    fn rewrite_expr(&mut self, expr: &mut Expr, ctx: &mut RewriteContext<'_>) {
        match expr {
            Expr::Literal(..) | Expr::Name { .. } => {}
            Expr::UnaryOp { operand, .. } => self.rewrite_expr(operand, ctx),
            Expr::BinOp { left, right, .. } => {
                self.rewrite_expr(left, ctx);
                self.rewrite_expr(right, ctx);
            }
            Expr::Compare {
                left, comparators, ..
            } => {
                self.rewrite_expr(left, ctx);
                for comparator in comparators {
                    self.rewrite_expr(comparator, ctx);
                }
            }
            Expr::Call {
                func,
                args,
                keywords,
                ..
            } => {
                self.rewrite_expr(func, ctx);
                for arg in args {
                    self.rewrite_expr(arg, ctx);
                }
                for keyword in keywords {
                    self.rewrite_expr(&mut keyword.value, ctx);
                }
            }
            Expr::Tuple { elts, .. } | Expr::Intrinsic { args: elts, .. } => {
                for elt in elts {
                    self.rewrite_expr(elt, ctx);
                }
            }
        }

        match expr {
            Expr::Literal(Lit::Int(_), span) => {
                let span = *span;
                let inner = take_expr(expr);
                *expr = Expr::Intrinsic {
                    kind: IntrinsicKind::WrapInteger,
                    args: vec![inner],
                    span,
                };
            }
            Expr::Name { id, .. } => {
                if !ctx.ns.contains(id) {
                    let value = ctx.algebra.make_symbol(id);
                    ctx.ns.insert(id.clone(), value);
                    self.pending.push(id.clone());
                    debug!(name = %id, "promoted free identifier to a symbol");
                }
            }
            Expr::Compare { ops, .. }
                if ops.len() == 1 && matches!(ops[0], CmpOp::Eq | CmpOp::Ne) =>
            {
                self.rewrite_comparison(expr, ctx);
            }
            Expr::Call { .. } => self.coerce_call(expr, ctx),
            _ => {}
        }
    }

    /// `a == b` with a symbol on either side builds an equation value
    /// instead of evaluating to a boolean. Chained comparisons keep their
    /// comparison semantics.
    fn rewrite_comparison(&self, expr: &mut Expr, ctx: &RewriteContext<'_>) {
        let Expr::Compare {
            left,
            ops,
            comparators,
            span,
        } = expr
        else {
            return;
        };
        if !has_symbol(left, ctx.ns) && !has_symbol(&comparators[0], ctx.ns) {
            return;
        }
        let kind = if ops[0] == CmpOp::Eq {
            IntrinsicKind::Equation
        } else {
            IntrinsicKind::Inequation
        };
        let span = *span;
        let lhs = take_expr(left.as_mut());
        let rhs = take_expr(&mut comparators[0]);
        *expr = Expr::Intrinsic {
            kind,
            args: vec![lhs, rhs],
            span,
        };
    }

    /// A call whose target is not callable is really a product. Keyword
    /// arguments have no multiplicative reading; with positional arguments
    /// present they are dropped, and a keyword-only call is left alone.
    fn coerce_call(&self, expr: &mut Expr, ctx: &mut RewriteContext<'_>) {
        let Expr::Call {
            func,
            args,
            keywords,
            span,
        } = expr
        else {
            return;
        };
        let callable = match eval_expr(func, ctx.ns, ctx.algebra) {
            Ok(value) => value.is_callable(),
            Err(ExecError::NameNotFound(_)) => false,
            Err(err) => {
                warn!(%err, "could not resolve call target, leaving call in place");
                return;
            }
        };
        if callable || args.is_empty() {
            return;
        }
        if !keywords.is_empty() {
            debug!(
                count = keywords.len(),
                "dropping keyword arguments while coercing call to multiplication"
            );
        }
        let span = *span;
        let lhs = take_expr(func.as_mut());
        let rhs = if args.len() == 1 {
            take_expr(&mut args[0])
        } else {
            Expr::Tuple {
                elts: std::mem::take(args),
                span: Span::dummy(),
            }
        };
        *expr = Expr::BinOp {
            op: BinOp::Mul,
            left: Box::new(lhs),
            right: Box::new(rhs),
            span,
        };
    }
}

impl TreeRewrite for SymbolRewriter {
    fn rewrite(&mut self, module: &mut Module, ctx: &mut RewriteContext<'_>) {
        for stmt in &mut module.body {
            match stmt {
                Stmt::Expr(expr) => self.rewrite_expr(expr, ctx),
                Stmt::Assign { value, .. } => self.rewrite_expr(value, ctx),
                Stmt::Delete { .. } => {}
            }
        }
    }
}
