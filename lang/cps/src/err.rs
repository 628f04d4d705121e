use lscript_statics::ResolveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("division by zero in `{expr}`")]
    DivisionByZero { expr: String },
    #[error("`{tag}` cannot appear in a continuation-passing program")]
    Malformed { tag: &'static str },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
