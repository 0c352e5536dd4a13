//! Tree-walking evaluator
//!
//! Executes rewritten trees against the namespace. Arithmetic goes through
//! the symbolic expression tree so integer math stays exact; floats drop
//! back out as plain values.

use crate::engine::namespace::Namespace;
use crate::engine::value::{Builtin, Value};
use crate::parser::ast::{BinOp, CmpOp, Expr, IntrinsicKind, Lit, Stmt, UnOp};
use crate::symbolic::{AlgebraError, SymExpr, SymbolicAlgebra};

/// Failure raised by executed code.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("name '{0}' is not defined")]
    NameNotFound(String),
    #[error("'{0}' object is not callable")]
    NotCallable(&'static str),
    #[error("{0}")]
    TypeMismatch(String),
    #[error("{name}() takes {expected} argument(s), got {got}")]
    WrongArity {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}

/// Evaluate one expression. Read-only with respect to the namespace.
pub fn eval_expr(
    expr: &Expr,
    ns: &Namespace,
    algebra: &dyn SymbolicAlgebra,
) -> Result<Value, ExecError> {
    match expr {
        Expr::Literal(lit, _) => Ok(match lit {
            Lit::Int(v) => algebra.make_integer(*v),
            Lit::Float(v) => Value::Float(*v),
            Lit::Bool(v) => Value::Bool(*v),
        }),
        Expr::Name { id, .. } => ns
            .get(id)
            .cloned()
            .ok_or_else(|| ExecError::NameNotFound(id.clone())),
        Expr::UnaryOp { op, operand, .. } => unary(*op, &eval_expr(operand, ns, algebra)?),
        Expr::BinOp {
            op, left, right, ..
        } => binary(
            *op,
            &eval_expr(left, ns, algebra)?,
            &eval_expr(right, ns, algebra)?,
        ),
        Expr::Compare {
            left,
            ops,
            comparators,
            ..
        } => {
            let mut prev = eval_expr(left, ns, algebra)?;
            for (op, comparator) in ops.iter().zip(comparators) {
                let next = eval_expr(comparator, ns, algebra)?;
                if !compare(*op, &prev, &next)? {
                    return Ok(Value::Bool(false));
                }
                prev = next;
            }
            Ok(Value::Bool(true))
        }
        Expr::Call {
            func,
            args,
            keywords,
            ..
        } => {
            let callee = eval_expr(func, ns, algebra)?;
            let Value::Builtin(builtin) = callee else {
                return Err(ExecError::NotCallable(callee.type_name()));
            };
            if !keywords.is_empty() {
                return Err(ExecError::TypeMismatch(format!(
                    "{}() takes no keyword arguments",
                    builtin.name
                )));
            }
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, ns, algebra)?);
            }
            (builtin.func)(&values)
        }
        Expr::Tuple { elts, .. } => elts
            .iter()
            .map(|e| eval_expr(e, ns, algebra))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Tuple),
        Expr::Intrinsic { kind, args, .. } => eval_intrinsic(*kind, args, ns, algebra),
    }
}

fn eval_intrinsic(
    kind: IntrinsicKind,
    args: &[Expr],
    ns: &Namespace,
    algebra: &dyn SymbolicAlgebra,
) -> Result<Value, ExecError> {
    match kind {
        IntrinsicKind::WrapInteger => match args {
            [Expr::Literal(Lit::Int(v), _)] => Ok(algebra.make_integer(*v)),
            [arg] => eval_expr(arg, ns, algebra),
            _ => Err(ExecError::WrongArity {
                name: "Integer",
                expected: 1,
                got: args.len(),
            }),
        },
        IntrinsicKind::Equation | IntrinsicKind::Inequation => {
            let [left, right] = args else {
                return Err(ExecError::WrongArity {
                    name: if kind == IntrinsicKind::Equation {
                        "Eq"
                    } else {
                        "Ne"
                    },
                    expected: 2,
                    got: args.len(),
                });
            };
            let a = eval_expr(left, ns, algebra)?;
            let b = eval_expr(right, ns, algebra)?;
            let result = match kind {
                IntrinsicKind::Equation => algebra.make_eq(a, b),
                _ => algebra.make_ne(a, b),
            };
            result.map_err(Into::into)
        }
    }
}

/// Execute one statement. Expression statements surface their value.
pub fn exec_stmt(
    stmt: &Stmt,
    ns: &mut Namespace,
    algebra: &dyn SymbolicAlgebra,
) -> Result<Option<Value>, ExecError> {
    match stmt {
        Stmt::Expr(expr) => eval_expr(expr, ns, algebra).map(Some),
        Stmt::Assign { target, value, .. } => {
            let value = eval_expr(value, ns, algebra)?;
            ns.insert(target.clone(), value);
            Ok(None)
        }
        Stmt::Delete { names, .. } => {
            for name in names {
                ns.remove(name)
                    .ok_or_else(|| ExecError::NameNotFound(name.clone()))?;
            }
            Ok(None)
        }
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
    }
}

/// Floats fold back to plain float values; everything else stays symbolic.
fn normalize(expr: SymExpr) -> Value {
    match expr {
        SymExpr::Float(v) => Value::Float(v),
        other => Value::Symbolic(other),
    }
}

fn is_exact_zero(value: &Value) -> bool {
    match value {
        Value::Float(v) => *v == 0.0,
        Value::Symbolic(SymExpr::Integer(v)) => *v == 0,
        Value::Symbolic(SymExpr::Float(v)) => *v == 0.0,
        _ => false,
    }
}

fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, ExecError> {
    if matches!(op, BinOp::Div | BinOp::Mod) && is_exact_zero(right) {
        return Err(ExecError::DivisionByZero);
    }
    let mismatch = || {
        ExecError::TypeMismatch(format!(
            "unsupported operand types for {}: '{}' and '{}'",
            op_symbol(op),
            left.type_name(),
            right.type_name()
        ))
    };
    let a = left.to_symbolic().map_err(|_| mismatch())?;
    let b = right.to_symbolic().map_err(|_| mismatch())?;
    let result = match op {
        BinOp::Add => SymExpr::add(a, b),
        BinOp::Sub => SymExpr::sub(a, b),
        BinOp::Mul => SymExpr::mul(a, b),
        BinOp::Div => SymExpr::div(a, b),
        BinOp::Mod => SymExpr::rem(a, b),
        BinOp::Pow => SymExpr::pow(a, b),
    };
    Ok(normalize(result))
}

fn unary(op: UnOp, value: &Value) -> Result<Value, ExecError> {
    let sym = value.to_symbolic().map_err(|_| {
        ExecError::TypeMismatch(format!(
            "unsupported operand type for unary: '{}'",
            value.type_name()
        ))
    })?;
    match op {
        UnOp::Neg => Ok(normalize(SymExpr::neg(sym))),
        UnOp::Pos => Ok(normalize(sym)),
    }
}

enum Num {
    Int(i128),
    Float(f64),
}

fn as_number(value: &Value) -> Option<Num> {
    match value {
        Value::Float(v) => Some(Num::Float(*v)),
        Value::Symbolic(SymExpr::Integer(v)) => Some(Num::Int(*v)),
        Value::Symbolic(SymExpr::Float(v)) => Some(Num::Float(*v)),
        _ => None,
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, ExecError> {
    if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
        let ordering = match (a, b) {
            (Num::Int(x), Num::Int(y)) => x.partial_cmp(&y),
            (Num::Int(x), Num::Float(y)) => (x as f64).partial_cmp(&y),
            (Num::Float(x), Num::Int(y)) => x.partial_cmp(&(y as f64)),
            (Num::Float(x), Num::Float(y)) => x.partial_cmp(&y),
        };
        let Some(ordering) = ordering else {
            // NaN involved
            return Ok(op == CmpOp::Ne);
        };
        return Ok(match op {
            CmpOp::Eq => ordering.is_eq(),
            CmpOp::Ne => !ordering.is_eq(),
            CmpOp::Lt => ordering.is_lt(),
            CmpOp::Le => ordering.is_le(),
            CmpOp::Gt => ordering.is_gt(),
            CmpOp::Ge => ordering.is_ge(),
        });
    }
    // non-numeric values only support (in)equality, structurally
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::Ne => Ok(left != right),
        _ => Err(ExecError::TypeMismatch(format!(
            "cannot order '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Bindings every fresh namespace starts with.
pub fn default_builtins() -> Vec<(String, Value)> {
    vec![
        (
            "abs".to_string(),
            Value::Builtin(Builtin {
                name: "abs",
                func: builtin_abs,
            }),
        ),
        (
            "float".to_string(),
            Value::Builtin(Builtin {
                name: "float",
                func: builtin_float,
            }),
        ),
    ]
}

fn expect_one<'a>(name: &'static str, args: &'a [Value]) -> Result<&'a Value, ExecError> {
    match args {
        [value] => Ok(value),
        _ => Err(ExecError::WrongArity {
            name,
            expected: 1,
            got: args.len(),
        }),
    }
}

fn builtin_abs(args: &[Value]) -> Result<Value, ExecError> {
    match expect_one("abs", args)? {
        Value::Float(v) => Ok(Value::Float(v.abs())),
        Value::Symbolic(SymExpr::Integer(v)) => v
            .checked_abs()
            .map(|v| Value::Symbolic(SymExpr::Integer(v)))
            .ok_or_else(|| ExecError::TypeMismatch("integer overflow in abs()".to_string())),
        other => Err(ExecError::TypeMismatch(format!(
            "cannot take abs of '{}'",
            other.type_name()
        ))),
    }
}

fn builtin_float(args: &[Value]) -> Result<Value, ExecError> {
    match expect_one("float", args)? {
        Value::Float(v) => Ok(Value::Float(*v)),
        Value::Symbolic(SymExpr::Integer(v)) => Ok(Value::Float(*v as f64)),
        Value::Symbolic(SymExpr::Float(v)) => Ok(Value::Float(*v)),
        other => Err(ExecError::TypeMismatch(format!(
            "cannot convert '{}' to float",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::symbolic::Algebra;

    fn eval(source: &str, ns: &mut Namespace) -> Result<Option<Value>, ExecError> {
        let module = parse(source).unwrap();
        let mut last = None;
        for stmt in &module.body {
            last = exec_stmt(stmt, ns, &Algebra)?;
        }
        Ok(last)
    }

    #[test]
    fn test_integer_arithmetic_is_exact() {
        let mut ns = Namespace::new();
        let value = eval("2 + 3 * 4", &mut ns).unwrap().unwrap();
        assert_eq!(value, Value::Symbolic(SymExpr::Integer(14)));

        // 1/3 does not collapse to a float
        let value = eval("1 / 3", &mut ns).unwrap().unwrap();
        assert!(matches!(value, Value::Symbolic(SymExpr::Div(..))));
    }

    #[test]
    fn test_float_arithmetic() {
        let mut ns = Namespace::new();
        let value = eval("1.5 + 2", &mut ns).unwrap().unwrap();
        assert_eq!(value, Value::Float(3.5));
    }

    #[test]
    fn test_assignment_and_lookup() {
        let mut ns = Namespace::new();
        eval("a = 6", &mut ns).unwrap();
        let value = eval("a / 2", &mut ns).unwrap().unwrap();
        assert_eq!(value, Value::Symbolic(SymExpr::Integer(3)));
    }

    #[test]
    fn test_delete_missing_name() {
        let mut ns = Namespace::new();
        assert!(matches!(
            eval("del ghost", &mut ns),
            Err(ExecError::NameNotFound(_))
        ));
    }

    #[test]
    fn test_division_by_zero() {
        let mut ns = Namespace::new();
        assert!(matches!(
            eval("1 / 0", &mut ns),
            Err(ExecError::DivisionByZero)
        ));
    }

    #[test]
    fn test_chained_comparison_semantics() {
        let mut ns = Namespace::new();
        assert_eq!(
            eval("1 < 2 < 3", &mut ns).unwrap().unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval("1 < 2 < 2", &mut ns).unwrap().unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_calling_non_callable() {
        let mut ns = Namespace::new();
        ns.insert("x", Value::Float(1.0));
        assert!(matches!(
            eval("x(2)", &mut ns),
            Err(ExecError::NotCallable("float"))
        ));
    }

    #[test]
    fn test_builtins() {
        let mut ns = Namespace::new();
        ns.extend(default_builtins());
        assert_eq!(
            eval("abs(0 - 4)", &mut ns).unwrap().unwrap(),
            Value::Symbolic(SymExpr::Integer(4))
        );
        assert_eq!(
            eval("float(3)", &mut ns).unwrap().unwrap(),
            Value::Float(3.0)
        );
    }

    #[test]
    fn test_symbolic_ordering_fails() {
        let mut ns = Namespace::new();
        ns.insert("x", Algebra.make_symbol("x"));
        assert!(matches!(
            eval("x < 2", &mut ns),
            Err(ExecError::TypeMismatch(_))
        ));
    }
}
