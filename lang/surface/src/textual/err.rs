use lscript_utils::span::Cursor2;
use thiserror::Error;

/// Errors reported while turning source text into a term.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{at}: unexpected character `{text}`")]
    UnexpectedChar { text: String, at: Cursor2 },
    #[error("{at}: unexpected `{found}`, expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str, at: Cursor2 },
    #[error("{at}: unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str, at: Cursor2 },
    #[error("{at}: cannot assign to `{target}`")]
    InvalidAssign { target: String, at: Cursor2 },
    #[error("{at}: unknown operator `{op}`")]
    UnknownOperator { op: String, at: Cursor2 },
    #[error("{at}: malformed number `{text}`")]
    BadNumber { text: String, at: Cursor2 },
    #[error("{at}: expression nested deeper than {limit} levels")]
    TooDeep { limit: usize, at: Cursor2 },
}

pub type Result<T> = std::result::Result<T, ParseError>;
