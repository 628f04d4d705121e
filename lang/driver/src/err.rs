use lscript_cps::OptimizeError;
use lscript_dynamics::RuntimeError;
use lscript_statics::ResolveError;
use lscript_surface::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    ConfError(#[from] toml::de::Error),
    #[error("invalid configuration: budget must be at least 1")]
    ZeroBudget,
    #[error("{0}")]
    ParseError(#[from] ParseError),
    #[error("{0}")]
    ResolveError(#[from] ResolveError),
    #[error("{0}")]
    OptimizeError(#[from] OptimizeError),
    #[error("{0}")]
    RuntimeError(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, BuildError>;
