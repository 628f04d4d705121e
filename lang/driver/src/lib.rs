//! The lscript compilation pipeline, from source text to a running program.

pub mod conf;
pub mod err;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use conf::Conf;
pub use err::*;
pub use pipeline::{Compiled, Compiler, Stage};
