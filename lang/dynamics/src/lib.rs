//! Loads generated programs and runs them under the trampoline.

pub mod syntax;
pub use syntax::*;
mod impls;
pub mod err;
pub use err::*;
pub mod builtin;
pub mod link;
pub use link::{Link, link};
pub mod eval;
pub use eval::Eval;
pub mod runtime;
pub use runtime::{Checkpoint, StepBudget};
