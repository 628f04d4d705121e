#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod arena;
pub mod gensym;
pub mod span;
