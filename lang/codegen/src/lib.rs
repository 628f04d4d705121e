//! The code generator lowers a resolved program to [`Program`], an
//! expression-only subset of JavaScript wrapped in a procedure of three host
//! hooks. Guarded procedures start with a checkpoint that lets the host
//! unwind the stack and resume later from a trampoline.

pub mod syntax;
pub use syntax::*;
pub mod emit;
pub use emit::{Emitter, Lower};
