//! Rewrite passes
//!
//! Two kinds of pass run over a submission before it executes: line
//! rewriters on the raw text, then tree rewriters on the parsed module.
//! Both are trait objects so the shell can toggle them at runtime.

pub mod auto_symbol;
pub mod implied_mul;

pub use auto_symbol::SymbolRewriter;
pub use implied_mul::ImpliedMultiplication;

use crate::engine::namespace::Namespace;
use crate::parser::ast::Module;
use crate::symbolic::SymbolicAlgebra;

/// Everything a tree rewriter may consult or mutate.
pub struct RewriteContext<'a> {
    pub ns: &'a mut Namespace,
    pub algebra: &'a dyn SymbolicAlgebra,
}

/// A pass over the raw source text, one physical line at a time.
///
/// Line rewriters must be total: whatever the input, they return a line,
/// falling back to the original on internal failure.
pub trait LineRewrite {
    fn rewrite_line(&mut self, line: &str) -> String;

    /// Apply the pass to every physical line of a submission.
    fn rewrite_lines(&mut self, text: &str) -> String {
        text.split('\n')
            .map(|line| self.rewrite_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A pass over the parsed tree, running between parse and execution.
pub trait TreeRewrite {
    fn rewrite(&mut self, module: &mut Module, ctx: &mut RewriteContext<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Suffixer;

    impl LineRewrite for Suffixer {
        fn rewrite_line(&mut self, line: &str) -> String {
            format!("{line}!")
        }
    }

    #[test]
    fn test_rewrite_lines_is_per_physical_line() {
        assert_eq!(Suffixer.rewrite_lines("a\nb\nc"), "a!\nb!\nc!");
        assert_eq!(Suffixer.rewrite_lines(""), "!");
    }
}
