//! abacus -- an interactive symbolic expression calculator.
//!
//! Submissions pass through a rewrite pipeline before they run: line
//! rewrites make implied multiplication explicit, tree rewrites wrap
//! integer literals, promote free identifiers to symbols, and turn
//! `==`/`!=` on symbolic operands into equations. [`engine::Shell`] drives
//! the pipeline and owns the session namespace.
//!
//! ```
//! use abacus::engine::Shell;
//!
//! let mut shell = Shell::new();
//! let value = shell.run("2x + 1").unwrap().unwrap();
//! assert_eq!(value.to_string(), "2*x + 1");
//! ```

pub mod engine;
pub mod lexer;
pub mod parser;
pub mod symbolic;
pub mod transform;
pub mod util;

pub use engine::{Shell, ShellError, Value};

pub const NAME: &str = "abacus";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run one submission in a throwaway shell.
pub fn run(text: &str) -> Result<Option<Value>, ShellError> {
    Shell::new().run(text)
}

/// Run a script file in a throwaway shell.
pub fn run_file(path: &std::path::Path) -> Result<Option<Value>, ShellError> {
    Shell::new().run_file(path)
}
