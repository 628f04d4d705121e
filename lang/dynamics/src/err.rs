use crate::syntax::Continuation;
use derive_more::From;
use lscript_syntax::{BinOp, OpError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("`{0}` is not a function")]
    NotCallable(String),
    #[error("cannot apply `{op}` to a {lhs} and a {rhs}")]
    Type { op: BinOp, lhs: &'static str, rhs: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("the program finished without producing a result")]
    NoResult,
    #[error("cannot write program output: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OpError> for RuntimeError {
    fn from(err: OpError) -> Self {
        match err {
            | OpError::DivisionByZero => RuntimeError::DivisionByZero,
            | OpError::Mismatch { op, lhs, rhs } => RuntimeError::Type { op, lhs, rhs },
        }
    }
}

/// Why evaluation left the current activation early.
#[derive(From, Debug)]
pub enum Unwind {
    /// a checkpoint captured the rest of the computation
    Suspend(Continuation),
    Fault(RuntimeError),
}

impl From<OpError> for Unwind {
    fn from(err: OpError) -> Self {
        Unwind::Fault(err.into())
    }
}

impl From<std::io::Error> for Unwind {
    fn from(err: std::io::Error) -> Self {
        Unwind::Fault(err.into())
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
