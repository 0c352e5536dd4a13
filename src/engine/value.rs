//! Runtime values

use std::fmt;

use crate::engine::eval::ExecError;
use crate::symbolic::{AlgebraError, SymExpr};

/// Signature of a builtin function.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, ExecError>;

/// A named builtin. Compared by name.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Value living in the execution namespace. Exact integers only exist
/// inside [`SymExpr`]; a bare integer literal is wrapped before it ever
/// reaches execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Float(f64),
    Str(String),
    Tuple(Vec<Value>),
    Symbolic(SymExpr),
    Builtin(Builtin),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::Symbolic(_) => "symbolic",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Whether calling this value makes sense.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Builtin(_))
    }

    /// The symbol name, if this value is exactly a symbolic variable.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbolic(SymExpr::Symbol(name)) => Some(name),
            _ => None,
        }
    }

    /// View this value as a symbolic expression, for handing to the
    /// algebra backend.
    pub fn to_symbolic(&self) -> Result<SymExpr, AlgebraError> {
        match self {
            Value::Symbolic(expr) => Ok(expr.clone()),
            Value::Float(v) => Ok(SymExpr::Float(*v)),
            other => Err(AlgebraError::NotSymbolic(other.type_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            Value::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Value::Str(v) => write!(f, "{v}"),
            Value::Tuple(elts) => {
                write!(f, "(")?;
                for (i, elt) in elts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elt}")?;
                }
                if elts.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Symbolic(expr) => write!(f, "{expr}"),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_symbol() {
        let x = Value::Symbolic(SymExpr::Symbol("x".into()));
        assert_eq!(x.as_symbol(), Some("x"));

        let sum = Value::Symbolic(SymExpr::add(
            SymExpr::Symbol("x".into()),
            SymExpr::Integer(1),
        ));
        assert_eq!(sum.as_symbol(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(
            Value::Tuple(vec![Value::Float(1.0), Value::Float(2.5)]).to_string(),
            "(1.0, 2.5)"
        );
    }
}
