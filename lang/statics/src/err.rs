use lscript_syntax::VarName;
use thiserror::Error;

/// Errors reported during name resolution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("unbound variable `{0}`")]
    Unbound(VarName),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
