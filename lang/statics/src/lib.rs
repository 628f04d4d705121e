//! Lexical scope resolution.
//!
//! A [`Resolver`] pass numbers every variable occurrence, attaches it to the
//! binding it refers to, and returns a [`Scope`] holding the frame tree and
//! the per-binding usage counts the optimizer decides with.

pub mod scope;
pub use scope::*;
pub mod resolver;
pub use resolver::*;
pub mod err;
pub use err::*;
