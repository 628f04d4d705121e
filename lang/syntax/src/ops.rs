//! Binary operators and their meaning on literals.
//!
//! Constant folding and the runtime share [`BinOp::fold`], so a folded
//! program and an unfolded one agree on every operand pair.

use crate::Literal;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Error, Clone, Debug, PartialEq)]
pub enum OpError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot apply `{op}` to a {lhs} and a {rhs}")]
    Mismatch { op: BinOp, lhs: &'static str, rhs: &'static str },
}

impl BinOp {
    pub const ALL: [BinOp; 13] = [
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::Div,
        BinOp::Mod,
        BinOp::Lt,
        BinOp::Gt,
        BinOp::Le,
        BinOp::Ge,
        BinOp::Eq,
        BinOp::Ne,
        BinOp::And,
        BinOp::Or,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            | BinOp::Add => "+",
            | BinOp::Sub => "-",
            | BinOp::Mul => "*",
            | BinOp::Div => "/",
            | BinOp::Mod => "%",
            | BinOp::Lt => "<",
            | BinOp::Gt => ">",
            | BinOp::Le => "<=",
            | BinOp::Ge => ">=",
            | BinOp::Eq => "==",
            | BinOp::Ne => "!=",
            | BinOp::And => "&&",
            | BinOp::Or => "||",
        }
    }

    pub fn from_symbol(s: &str) -> Option<BinOp> {
        BinOp::ALL.into_iter().find(|op| op.symbol() == s)
    }

    /// `&&` and `||` may skip their right operand at runtime.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn fold(self, lhs: &Literal, rhs: &Literal) -> Result<Literal, OpError> {
        use Literal as L;
        let res = match (self, lhs, rhs) {
            | (BinOp::And, l, r) => {
                if l.is_truthy() {
                    r.clone()
                } else {
                    L::Bool(false)
                }
            }
            | (BinOp::Or, l, r) => {
                if l.is_truthy() {
                    l.clone()
                } else {
                    r.clone()
                }
            }
            // literals of different kinds are never equal
            | (BinOp::Eq, l, r) => L::Bool(l == r),
            | (BinOp::Ne, l, r) => L::Bool(l != r),
            | (BinOp::Add, L::Num(a), L::Num(b)) => L::Num(a + b),
            | (BinOp::Add, L::Str(_), _) | (BinOp::Add, _, L::Str(_)) => {
                L::Str(format!("{}{}", lhs.show(), rhs.show()))
            }
            | (BinOp::Div | BinOp::Mod, L::Num(_), L::Num(b)) if *b == 0.0 => {
                Err(OpError::DivisionByZero)?
            }
            | (BinOp::Sub, L::Num(a), L::Num(b)) => L::Num(a - b),
            | (BinOp::Mul, L::Num(a), L::Num(b)) => L::Num(a * b),
            | (BinOp::Div, L::Num(a), L::Num(b)) => L::Num(a / b),
            | (BinOp::Mod, L::Num(a), L::Num(b)) => L::Num(a % b),
            | (BinOp::Lt, L::Num(a), L::Num(b)) => L::Bool(a < b),
            | (BinOp::Gt, L::Num(a), L::Num(b)) => L::Bool(a > b),
            | (BinOp::Le, L::Num(a), L::Num(b)) => L::Bool(a <= b),
            | (BinOp::Ge, L::Num(a), L::Num(b)) => L::Bool(a >= b),
            | (BinOp::Lt, L::Str(a), L::Str(b)) => L::Bool(a < b),
            | (BinOp::Gt, L::Str(a), L::Str(b)) => L::Bool(a > b),
            | (BinOp::Le, L::Str(a), L::Str(b)) => L::Bool(a <= b),
            | (BinOp::Ge, L::Str(a), L::Str(b)) => L::Bool(a >= b),
            | (op, l, r) => Err(OpError::Mismatch { op, lhs: l.kind(), rhs: r.kind() })?,
        };
        Ok(res)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n(x: f64) -> Literal {
        Literal::Num(x)
    }
    fn s(x: &str) -> Literal {
        Literal::Str(x.to_string())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(BinOp::Add.fold(&n(2.0), &n(12.0)), Ok(n(14.0)));
        assert_eq!(BinOp::Mod.fold(&n(-7.0), &n(3.0)), Ok(n(-1.0)));
        assert_eq!(BinOp::Div.fold(&n(1.0), &n(0.0)), Err(OpError::DivisionByZero));
        assert_eq!(BinOp::Mod.fold(&n(1.0), &n(0.0)), Err(OpError::DivisionByZero));
    }

    #[test]
    fn concatenation_uses_display_forms() {
        assert_eq!(BinOp::Add.fold(&s("n = "), &n(3.0)), Ok(s("n = 3")));
        assert_eq!(BinOp::Add.fold(&Literal::Bool(true), &s("!")), Ok(s("true!")));
    }

    #[test]
    fn equality_across_kinds() {
        assert_eq!(BinOp::Eq.fold(&n(1.0), &s("1")), Ok(Literal::Bool(false)));
        assert_eq!(BinOp::Ne.fold(&n(1.0), &s("1")), Ok(Literal::Bool(true)));
        assert_eq!(BinOp::Eq.fold(&s("a"), &s("a")), Ok(Literal::Bool(true)));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(BinOp::Or.fold(&n(0.0), &n(5.0)), Ok(n(0.0)));
        assert_eq!(BinOp::Or.fold(&Literal::Bool(false), &n(5.0)), Ok(n(5.0)));
        assert_eq!(BinOp::And.fold(&Literal::Bool(false), &n(5.0)), Ok(Literal::Bool(false)));
        assert_eq!(BinOp::And.fold(&n(1.0), &n(5.0)), Ok(n(5.0)));
    }

    #[test]
    fn mismatched_kinds_are_rejected() {
        assert_eq!(
            BinOp::Mul.fold(&Literal::Bool(true), &n(2.0)),
            Err(OpError::Mismatch { op: BinOp::Mul, lhs: "boolean", rhs: "number" })
        );
        assert!(BinOp::Lt.fold(&s("a"), &n(2.0)).is_err());
    }

    #[test]
    fn symbols_round_trip() {
        for op in BinOp::ALL {
            assert_eq!(BinOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinOp::from_symbol("=>"), None);
    }
}
