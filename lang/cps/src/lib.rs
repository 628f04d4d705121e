//! Continuation-passing style: the transformer that produces it and the
//! optimizer that cleans up after it.

pub mod effects;
pub use effects::has_side_effects;
pub mod transform;
pub use transform::Transformer;
pub mod optimize;
pub use optimize::{Optimized, Optimizer};
pub mod err;
pub use err::*;
