//! Surface syntax: source text to [`lscript_syntax::Term`].

pub mod textual {
    /// Logos-based lexer and token definitions.
    pub mod lexer;
    pub use lexer::*;
    /// Recursive-descent parser producing direct-style terms.
    pub mod parser;
    pub use parser::*;
    /// Parse error definitions.
    pub mod err;
    pub use err::*;
}

pub use textual::{ParseError, Parser, parse};
