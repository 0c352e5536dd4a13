//! End-to-end runs through the full pipeline: line rewrites, parse, tree
//! rewrites, execution, post-execute cleanup.

use abacus::engine::{Shell, ShellError, Value};
use abacus::symbolic::SymExpr;

fn run_display(shell: &mut Shell, text: &str) -> String {
    shell
        .run(text)
        .unwrap()
        .map(|value| value.to_string())
        .unwrap_or_default()
}

#[test]
fn free_symbols_live_for_one_submission() {
    let mut shell = Shell::new();

    assert_eq!(run_display(&mut shell, "x + 1"), "x + 1");
    assert!(!shell.namespace().contains("x"));

    // same answer the second time around, nothing carried over
    assert_eq!(run_display(&mut shell, "x + 1"), "x + 1");
    assert!(!shell.namespace().contains("x"));
}

#[test]
fn cleanup_survives_failed_submissions() {
    let mut shell = Shell::new();
    assert!(shell.run("x / 0").is_err());
    assert!(!shell.namespace().contains("x"));

    assert!(shell.run("y + (").is_err());
    assert!(!shell.namespace().contains("y"));
}

#[test]
fn implied_multiplication_end_to_end() {
    let mut shell = Shell::new();
    assert_eq!(run_display(&mut shell, "2x"), "2*x");
    assert_eq!(run_display(&mut shell, "2 x y"), "2*x*y");
    assert_eq!(run_display(&mut shell, "(1 + 1)(3)"), "6");
}

#[test]
fn equations_build_instead_of_comparing() {
    let mut shell = Shell::new();
    assert_eq!(run_display(&mut shell, "x == 2"), "x == 2");
    assert_eq!(run_display(&mut shell, "x != y"), "x != y");

    // purely numeric comparisons still compare
    assert_eq!(run_display(&mut shell, "1 == 2"), "false");
    // chained comparisons keep comparison semantics even with numbers
    assert_eq!(run_display(&mut shell, "1 < 2 < 3"), "true");
}

#[test]
fn symbols_inside_tuples_do_not_trigger_equations() {
    let mut shell = Shell::new();
    // the tuple operand is not an equation operand; this compares and is
    // simply unequal
    assert_eq!(
        shell.run("(x, 1) == 2").unwrap().unwrap(),
        Value::Bool(false)
    );
    assert!(!shell.namespace().contains("x"));
}

#[test]
fn calls_on_callables_stay_calls() {
    let mut shell = Shell::new();
    assert_eq!(run_display(&mut shell, "abs(-4)"), "4");
    assert_eq!(run_display(&mut shell, "float(3)"), "3.0");
}

#[test]
fn calls_on_symbols_become_products() {
    let mut shell = Shell::new();
    assert_eq!(run_display(&mut shell, "g(5)"), "g*5");
    assert!(!shell.namespace().contains("g"));
}

#[test]
fn assignments_persist_and_delete_unbinds() {
    let mut shell = Shell::new();
    assert!(shell.run("a = 6").unwrap().is_none());
    assert_eq!(run_display(&mut shell, "a / 2"), "3");

    shell.run("del a").unwrap();
    assert!(!shell.namespace().contains("a"));
    // a free again: back to being a symbol for one submission
    assert_eq!(run_display(&mut shell, "a"), "a");
}

#[test]
fn multi_statement_submission() {
    let mut shell = Shell::new();
    let value = shell.run("a = 2\na + 1").unwrap().unwrap();
    assert_eq!(value, Value::Symbolic(SymExpr::Integer(3)));
    // the assignment outlives the submission, the promotion does not win
    assert_eq!(
        shell.namespace().get("a"),
        Some(&Value::Symbolic(SymExpr::Integer(2)))
    );
}

#[test]
fn integer_arithmetic_stays_exact() {
    let mut shell = Shell::new();
    assert_eq!(run_display(&mut shell, "1 / 3"), "1/3");
    assert_eq!(run_display(&mut shell, "2**100"), "1267650600228229401496703205376");
    assert_eq!(run_display(&mut shell, "7 % 3"), "1");
}

#[test]
fn booleans_are_not_wrapped() {
    let mut shell = Shell::new();
    assert_eq!(shell.run("true").unwrap().unwrap(), Value::Bool(true));
    assert!(!shell.namespace().contains("true"));
}

#[test]
fn toggling_passes_changes_behavior() {
    let mut shell = Shell::new();

    shell.set_implied_multiplication(false);
    assert!(matches!(shell.run("2x"), Err(ShellError::Syntax(_))));
    shell.set_implied_multiplication(true);
    assert!(shell.run("2x").is_ok());

    shell.set_auto_symbol(false);
    assert!(matches!(shell.run("q + 1"), Err(ShellError::Exec(_))));
    shell.set_auto_symbol(true);
    assert!(shell.run("q + 1").is_ok());
}

#[test]
fn push_seeds_the_namespace() {
    let mut shell = Shell::new();
    shell.push("tau", Value::Float(6.283185307179586));
    let value = shell.run("tau / 2").unwrap().unwrap();
    assert_eq!(value, Value::Float(3.141592653589793));
}

#[test]
fn run_file_is_one_submission() {
    let dir = std::env::temp_dir().join("abacus-test-scripts");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("basic.ab");
    std::fs::write(&path, "a = 2\n3a + 1\n").unwrap();

    let mut shell = Shell::new();
    let value = shell.run_file(&path).unwrap().unwrap();
    assert_eq!(value, Value::Symbolic(SymExpr::Integer(7)));

    std::fs::remove_file(&path).unwrap();
}
