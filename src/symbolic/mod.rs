//! Symbolic algebra capability
//!
//! The engine only needs three things from an algebra backend: minting
//! symbols, wrapping integers exactly, and building equations. The trait
//! keeps that boundary explicit; [`Algebra`] is the bundled implementation
//! over a small expression tree with constant folding.

use std::fmt;

use crate::engine::value::Value;

/// Failure while handing a runtime value to the algebra backend.
#[derive(Debug, thiserror::Error)]
pub enum AlgebraError {
    #[error("cannot use a value of type '{0}' in a symbolic expression")]
    NotSymbolic(&'static str),
}

/// What the engine requires of a symbolic-algebra backend.
pub trait SymbolicAlgebra {
    /// Construct a symbolic variable.
    fn make_symbol(&self, name: &str) -> Value;
    /// Wrap an integer literal in an exact symbolic integer.
    fn make_integer(&self, value: i128) -> Value;
    /// Build an equation from two operands.
    fn make_eq(&self, left: Value, right: Value) -> Result<Value, AlgebraError>;
    /// Build an inequation from two operands.
    fn make_ne(&self, left: Value, right: Value) -> Result<Value, AlgebraError>;
}

/// The bundled expression-tree backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Algebra;

impl SymbolicAlgebra for Algebra {
    fn make_symbol(&self, name: &str) -> Value {
        Value::Symbolic(SymExpr::Symbol(name.to_string()))
    }

    fn make_integer(&self, value: i128) -> Value {
        Value::Symbolic(SymExpr::Integer(value))
    }

    fn make_eq(&self, left: Value, right: Value) -> Result<Value, AlgebraError> {
        Ok(Value::Symbolic(SymExpr::Eq(
            Box::new(left.to_symbolic()?),
            Box::new(right.to_symbolic()?),
        )))
    }

    fn make_ne(&self, left: Value, right: Value) -> Result<Value, AlgebraError> {
        Ok(Value::Symbolic(SymExpr::Ne(
            Box::new(left.to_symbolic()?),
            Box::new(right.to_symbolic()?),
        )))
    }
}

/// Symbolic expression tree. Integer arithmetic is folded eagerly; anything
/// containing a symbol stays structural.
#[derive(Debug, Clone, PartialEq)]
pub enum SymExpr {
    Integer(i128),
    Float(f64),
    Symbol(String),
    Add(Box<SymExpr>, Box<SymExpr>),
    Sub(Box<SymExpr>, Box<SymExpr>),
    Mul(Box<SymExpr>, Box<SymExpr>),
    Div(Box<SymExpr>, Box<SymExpr>),
    Mod(Box<SymExpr>, Box<SymExpr>),
    Pow(Box<SymExpr>, Box<SymExpr>),
    Neg(Box<SymExpr>),
    Eq(Box<SymExpr>, Box<SymExpr>),
    Ne(Box<SymExpr>, Box<SymExpr>),
}

/// Fold two numeric leaves, promoting to float when either side is one.
fn fold_numeric(
    a: &SymExpr,
    b: &SymExpr,
    int_op: impl Fn(i128, i128) -> Option<i128>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Option<SymExpr> {
    match (a, b) {
        (SymExpr::Integer(x), SymExpr::Integer(y)) => int_op(*x, *y).map(SymExpr::Integer),
        (SymExpr::Integer(x), SymExpr::Float(y)) => Some(SymExpr::Float(float_op(*x as f64, *y))),
        (SymExpr::Float(x), SymExpr::Integer(y)) => Some(SymExpr::Float(float_op(*x, *y as f64))),
        (SymExpr::Float(x), SymExpr::Float(y)) => Some(SymExpr::Float(float_op(*x, *y))),
        _ => None,
    }
}

impl SymExpr {
    pub fn is_symbol(&self) -> bool {
        matches!(self, SymExpr::Symbol(_))
    }

    pub fn add(a: SymExpr, b: SymExpr) -> SymExpr {
        fold_numeric(&a, &b, i128::checked_add, |x, y| x + y)
            .unwrap_or_else(|| SymExpr::Add(Box::new(a), Box::new(b)))
    }

    pub fn sub(a: SymExpr, b: SymExpr) -> SymExpr {
        fold_numeric(&a, &b, i128::checked_sub, |x, y| x - y)
            .unwrap_or_else(|| SymExpr::Sub(Box::new(a), Box::new(b)))
    }

    pub fn mul(a: SymExpr, b: SymExpr) -> SymExpr {
        fold_numeric(&a, &b, i128::checked_mul, |x, y| x * y)
            .unwrap_or_else(|| SymExpr::Mul(Box::new(a), Box::new(b)))
    }

    /// Exact division: integer quotients only fold when they divide evenly,
    /// otherwise the quotient is kept structural.
    pub fn div(a: SymExpr, b: SymExpr) -> SymExpr {
        let folded = fold_numeric(
            &a,
            &b,
            |x, y| {
                if y != 0 && x % y == 0 {
                    Some(x / y)
                } else {
                    None
                }
            },
            |x, y| x / y,
        );
        match folded {
            // an unevenly dividing integer pair lands here as None too
            Some(value) => value,
            None => SymExpr::Div(Box::new(a), Box::new(b)),
        }
    }

    /// `%` takes the divisor's sign: `7 % -3` is `-2`, `-7 % 3` is `2`.
    pub fn rem(a: SymExpr, b: SymExpr) -> SymExpr {
        let folded = fold_numeric(
            &a,
            &b,
            |x, y| {
                if y == 0 {
                    return None;
                }
                x.checked_rem(y).map(|r| {
                    if r != 0 && (r < 0) != (y < 0) {
                        r + y
                    } else {
                        r
                    }
                })
            },
            |x, y| {
                let r = x % y;
                if r != 0.0 && (r < 0.0) != (y < 0.0) {
                    r + y
                } else {
                    r
                }
            },
        );
        match folded {
            Some(value) => value,
            None => SymExpr::Mod(Box::new(a), Box::new(b)),
        }
    }

    pub fn pow(a: SymExpr, b: SymExpr) -> SymExpr {
        if let (SymExpr::Integer(base), SymExpr::Integer(exp)) = (&a, &b) {
            if let Ok(exp) = u32::try_from(*exp) {
                if let Some(value) = base.checked_pow(exp) {
                    return SymExpr::Integer(value);
                }
            }
        }
        SymExpr::Pow(Box::new(a), Box::new(b))
    }

    pub fn neg(a: SymExpr) -> SymExpr {
        match a {
            SymExpr::Integer(x) => x.checked_neg().map_or_else(
                || SymExpr::Neg(Box::new(SymExpr::Integer(x))),
                SymExpr::Integer,
            ),
            SymExpr::Float(x) => SymExpr::Float(-x),
            SymExpr::Neg(inner) => *inner,
            other => SymExpr::Neg(Box::new(other)),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            SymExpr::Eq(..) | SymExpr::Ne(..) => 1,
            SymExpr::Add(..) | SymExpr::Sub(..) => 2,
            SymExpr::Mul(..) | SymExpr::Div(..) | SymExpr::Mod(..) => 3,
            SymExpr::Neg(..) => 4,
            SymExpr::Pow(..) => 5,
            SymExpr::Integer(..) | SymExpr::Float(..) | SymExpr::Symbol(..) => 7,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "(")?;
            self.fmt_inner(f)?;
            return write!(f, ")");
        }
        self.fmt_inner(f)
    }

    fn fmt_inner(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymExpr::Integer(v) => write!(f, "{v}"),
            SymExpr::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            SymExpr::Symbol(name) => write!(f, "{name}"),
            SymExpr::Add(a, b) => {
                a.fmt_prec(f, 2)?;
                write!(f, " + ")?;
                b.fmt_prec(f, 3)
            }
            SymExpr::Sub(a, b) => {
                a.fmt_prec(f, 2)?;
                write!(f, " - ")?;
                b.fmt_prec(f, 3)
            }
            SymExpr::Mul(a, b) => {
                a.fmt_prec(f, 3)?;
                write!(f, "*")?;
                b.fmt_prec(f, 4)
            }
            SymExpr::Div(a, b) => {
                a.fmt_prec(f, 3)?;
                write!(f, "/")?;
                b.fmt_prec(f, 4)
            }
            SymExpr::Mod(a, b) => {
                a.fmt_prec(f, 3)?;
                write!(f, " % ")?;
                b.fmt_prec(f, 4)
            }
            SymExpr::Pow(a, b) => {
                a.fmt_prec(f, 6)?;
                write!(f, "**")?;
                b.fmt_prec(f, 5)
            }
            SymExpr::Neg(a) => {
                write!(f, "-")?;
                a.fmt_prec(f, 4)
            }
            SymExpr::Eq(a, b) => {
                a.fmt_prec(f, 2)?;
                write!(f, " == ")?;
                b.fmt_prec(f, 2)
            }
            SymExpr::Ne(a, b) => {
                a.fmt_prec(f, 2)?;
                write!(f, " != ")?;
                b.fmt_prec(f, 2)
            }
        }
    }
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}
