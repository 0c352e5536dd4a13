//! Execution engine
//!
//! [`Shell`] owns the whole pipeline for one interactive session: line
//! rewrites, parse, tree rewrites, execution, and the post-execute event.
//! It is deliberately single-threaded; one shell per session.

pub mod eval;
pub mod namespace;
pub mod value;

pub use eval::{default_builtins, eval_expr, exec_stmt, ExecError};
pub use namespace::Namespace;
pub use value::Value;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::parser::ast::{fix_spans, Module, Stmt};
use crate::parser::{parse, ParseError};
use crate::symbolic::{Algebra, SymbolicAlgebra};
use crate::transform::{
    ImpliedMultiplication, LineRewrite, RewriteContext, SymbolRewriter, TreeRewrite,
};

/// Anything a submission can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("input is not a single expression")]
    NotAnExpression,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Identity of a registered pass, independent of trait-object fattening.
fn pass_key<T: ?Sized>(pass: &Rc<RefCell<T>>) -> *const () {
    Rc::as_ptr(pass).cast::<()>()
}

/// One interactive session: namespace, algebra backend, and the registered
/// rewrite passes and post-execute hooks.
pub struct Shell {
    ns: Namespace,
    algebra: Box<dyn SymbolicAlgebra>,
    line_rewrites: Vec<Rc<RefCell<dyn LineRewrite>>>,
    tree_rewrites: Vec<Rc<RefCell<dyn TreeRewrite>>>,
    post_execute: Vec<Box<dyn FnMut(&mut Namespace)>>,
    implied_mul: Rc<RefCell<ImpliedMultiplication>>,
    auto_symbol: Rc<RefCell<SymbolRewriter>>,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    /// A shell with the default passes registered and the builtins bound.
    pub fn new() -> Self {
        let mut ns = Namespace::new();
        ns.extend(default_builtins());
        ns.insert("__version__", Value::Str(crate::VERSION.to_string()));
        ns.insert(
            "__abacus__",
            Value::Str(format!("{} {}", crate::NAME, crate::VERSION)),
        );

        let implied_mul = Rc::new(RefCell::new(ImpliedMultiplication));
        let auto_symbol = Rc::new(RefCell::new(SymbolRewriter::new()));
        Self {
            ns,
            algebra: Box::new(Algebra),
            line_rewrites: vec![implied_mul.clone()],
            tree_rewrites: vec![auto_symbol.clone()],
            post_execute: Vec::new(),
            implied_mul,
            auto_symbol,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.ns
    }

    /// Bind a value directly, bypassing the pipeline.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.ns.insert(name, value);
    }

    /// Run one submission through the full pipeline. The post-execute event
    /// fires regardless of the outcome.
    pub fn run(&mut self, text: &str) -> Result<Option<Value>, ShellError> {
        let mut source = text.to_string();
        for pass in &self.line_rewrites {
            source = pass.borrow_mut().rewrite_lines(&source);
        }
        if source != text {
            debug!(rewritten = %source, "line rewrites applied");
        }
        let result = self.run_rewritten(&source);
        self.fire_post_execute();
        result
    }

    fn run_rewritten(&mut self, source: &str) -> Result<Option<Value>, ShellError> {
        let mut module = parse(source)?;
        for pass in &self.tree_rewrites {
            let mut ctx = RewriteContext {
                ns: &mut self.ns,
                algebra: self.algebra.as_ref(),
            };
            pass.borrow_mut().rewrite(&mut module, &mut ctx);
        }
        fix_spans(&mut module);
        self.execute_module(&module).map_err(Into::into)
    }

    /// Execute text with no rewrites and no post-execute event.
    pub fn execute(&mut self, text: &str) -> Result<Option<Value>, ShellError> {
        let mut module = parse(text)?;
        fix_spans(&mut module);
        self.execute_module(&module).map_err(Into::into)
    }

    /// Evaluate a single expression with no rewrites, leaving the namespace
    /// untouched.
    pub fn evaluate(&self, text: &str) -> Result<Value, ShellError> {
        let module = parse(text)?;
        let [Stmt::Expr(expr)] = module.body.as_slice() else {
            return Err(ShellError::NotAnExpression);
        };
        eval_expr(expr, &self.ns, self.algebra.as_ref()).map_err(Into::into)
    }

    /// Run a whole file as one submission.
    pub fn run_file(&mut self, path: &Path) -> Result<Option<Value>, ShellError> {
        let text = std::fs::read_to_string(path)?;
        self.run(&text)
    }

    /// Statements run in order; the value of the last one, if it is an
    /// expression statement, is the value of the submission.
    fn execute_module(&mut self, module: &Module) -> Result<Option<Value>, ExecError> {
        let mut last = None;
        for stmt in &module.body {
            last = exec_stmt(stmt, &mut self.ns, self.algebra.as_ref())?;
        }
        Ok(last)
    }

    /// Symbol cleanup always runs, even when the pass that mints symbols is
    /// toggled off or the submission failed.
    fn fire_post_execute(&mut self) {
        self.auto_symbol.borrow_mut().post_execute(&mut self.ns);
        for hook in &mut self.post_execute {
            hook(&mut self.ns);
        }
    }

    pub fn add_line_rewrite(&mut self, pass: Rc<RefCell<dyn LineRewrite>>) {
        self.line_rewrites.push(pass);
    }

    pub fn add_tree_rewrite(&mut self, pass: Rc<RefCell<dyn TreeRewrite>>) {
        self.tree_rewrites.push(pass);
    }

    pub fn on_post_execute(&mut self, hook: Box<dyn FnMut(&mut Namespace)>) {
        self.post_execute.push(hook);
    }

    /// Toggle the juxtaposition pass. Enabling twice registers it once.
    pub fn set_implied_multiplication(&mut self, enabled: bool) {
        let key = pass_key(&self.implied_mul);
        let present = self.line_rewrites.iter().position(|p| pass_key(p) == key);
        match (enabled, present) {
            (true, None) => self.line_rewrites.push(self.implied_mul.clone()),
            (false, Some(i)) => {
                self.line_rewrites.remove(i);
            }
            _ => {}
        }
    }

    /// Toggle the tree-rewriting pass. Cleanup of already minted symbols
    /// still happens on the next post-execute.
    pub fn set_auto_symbol(&mut self, enabled: bool) {
        let key = pass_key(&self.auto_symbol);
        let present = self.tree_rewrites.iter().position(|p| pass_key(p) == key);
        match (enabled, present) {
            (true, None) => self.tree_rewrites.push(self.auto_symbol.clone()),
            (false, Some(i)) => {
                self.tree_rewrites.remove(i);
            }
            _ => {}
        }
    }

    /// Banner printed when an interactive session starts.
    pub fn greeting(&self) -> String {
        format!(
            "{} {} -- a symbolic expression calculator\nfree names become symbols; `del x` unbinds",
            crate::NAME,
            crate::VERSION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::SymExpr;

    #[test]
    fn test_free_symbols_do_not_leak() {
        let mut shell = Shell::new();
        let value = shell.run("x + 1").unwrap().unwrap();
        assert!(matches!(value, Value::Symbolic(SymExpr::Add(..))));
        assert!(!shell.namespace().contains("x"));

        // second submission starts fresh
        let value = shell.run("x + 1").unwrap().unwrap();
        assert!(matches!(value, Value::Symbolic(SymExpr::Add(..))));
        assert!(!shell.namespace().contains("x"));
    }

    #[test]
    fn test_cleanup_runs_after_failure() {
        let mut shell = Shell::new();
        assert!(shell.run("x / 0").is_err());
        assert!(!shell.namespace().contains("x"));
    }

    #[test]
    fn test_implied_multiplication_in_pipeline() {
        let mut shell = Shell::new();
        let value = shell.run("2x").unwrap().unwrap();
        assert_eq!(
            value,
            Value::Symbolic(SymExpr::mul(
                SymExpr::Integer(2),
                SymExpr::Symbol("x".into())
            ))
        );
    }

    #[test]
    fn test_module_split_keeps_assignments() {
        let mut shell = Shell::new();
        let value = shell.run("a = 2\na + 1").unwrap().unwrap();
        assert_eq!(value, Value::Symbolic(SymExpr::Integer(3)));
        // `a` was promoted during rewriting but rebound by the submission
        assert_eq!(
            shell.namespace().get("a"),
            Some(&Value::Symbolic(SymExpr::Integer(2)))
        );
    }

    #[test]
    fn test_toggle_implied_multiplication() {
        let mut shell = Shell::new();
        shell.set_implied_multiplication(false);
        assert!(shell.run("2x").is_err());

        shell.set_implied_multiplication(true);
        shell.set_implied_multiplication(true);
        assert!(shell.run("2x").is_ok());
    }

    #[test]
    fn test_toggle_auto_symbol() {
        let mut shell = Shell::new();
        shell.set_auto_symbol(false);
        assert!(matches!(
            shell.run("x + 1"),
            Err(ShellError::Exec(ExecError::NameNotFound(_)))
        ));
        shell.set_auto_symbol(true);
        assert!(shell.run("x + 1").is_ok());
    }

    #[test]
    fn test_execute_bypasses_rewrites() {
        let mut shell = Shell::new();
        assert!(matches!(
            shell.execute("y + 1"),
            Err(ShellError::Exec(ExecError::NameNotFound(_)))
        ));
    }

    #[test]
    fn test_evaluate_single_expression_only() {
        let shell = Shell::new();
        assert_eq!(
            shell.evaluate("1 + 2").unwrap(),
            Value::Symbolic(SymExpr::Integer(3))
        );
        assert!(matches!(
            shell.evaluate("a = 1"),
            Err(ShellError::NotAnExpression)
        ));
    }

    #[test]
    fn test_push_makes_names_visible() {
        let mut shell = Shell::new();
        shell.push("half", Value::Float(0.5));
        let value = shell.run("half + half").unwrap().unwrap();
        assert_eq!(value, Value::Float(1.0));
    }

    #[test]
    fn test_seeded_namespace() {
        let shell = Shell::new();
        assert!(shell.namespace().contains("__version__"));
        assert!(shell.namespace().contains("abs"));
    }
}
