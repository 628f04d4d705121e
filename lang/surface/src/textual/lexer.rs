use logos::Logos;
use std::fmt::Display;

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Tok<'input> {
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("func")]
    Func,
    #[token("true")]
    True,
    #[token("false")]
    False,

    /// identifiers may carry `?!-<>=` after the first character
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_?!\-<>=]*")]
    Ident(&'input str),
    #[regex(r"[0-9]+(\.[0-9]*)?")]
    NumLit(&'input str),
    #[regex(r#""([^"\\]|\\.)*""#)]
    StrLit(&'input str),
    /// a maximal run of operator characters; validated by the parser
    #[regex(r"[+\-*/%=&|<>!]+")]
    Op(&'input str),

    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
}

impl Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            | Tok::Let => write!(f, "let"),
            | Tok::If => write!(f, "if"),
            | Tok::Then => write!(f, "then"),
            | Tok::Else => write!(f, "else"),
            | Tok::Func => write!(f, "func"),
            | Tok::True => write!(f, "true"),
            | Tok::False => write!(f, "false"),
            | Tok::Ident(s) | Tok::NumLit(s) | Tok::StrLit(s) | Tok::Op(s) => write!(f, "{}", s),
            | Tok::ParenOpen => write!(f, "("),
            | Tok::ParenClose => write!(f, ")"),
            | Tok::BracketOpen => write!(f, "["),
            | Tok::BracketClose => write!(f, "]"),
            | Tok::BraceOpen => write!(f, "{{"),
            | Tok::BraceClose => write!(f, "}}"),
            | Tok::Comma => write!(f, ","),
            | Tok::Semicolon => write!(f, ";"),
        }
    }
}

/// A token with its byte range.
pub type Spanned<'input> = (usize, Tok<'input>, usize);

pub struct Lexer<'source> {
    inner: logos::SpannedIter<'source, Tok<'source>>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self { inner: Tok::lexer(source).spanned() }
    }
}

impl<'source> Iterator for Lexer<'source> {
    /// `Err` carries the byte range of a character no token starts with.
    type Item = Result<Spanned<'source>, (usize, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            | (Ok(tok), range) => Some(Ok((range.start, tok, range.end))),
            | (Err(()), range) => Some(Err((range.start, range.end))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn toks(src: &str) -> Vec<Tok<'_>> {
        Lexer::new(src).map(|t| t.map(|(_, tok, _)| tok)).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            toks("let letter if? func"),
            vec![Tok::Let, Tok::Ident("letter"), Tok::Ident("if?"), Tok::Func]
        );
    }

    #[test]
    fn identifiers_swallow_dashes() {
        assert_eq!(toks("n-1 n - 1"), vec![
            Tok::Ident("n-1"),
            Tok::Ident("n"),
            Tok::Op("-"),
            Tok::NumLit("1")
        ]);
    }

    #[test]
    fn comments_and_literals() {
        assert_eq!(toks("# note\n3.25 \"a\\\"b\" >= # trailing"), vec![
            Tok::NumLit("3.25"),
            Tok::StrLit("\"a\\\"b\""),
            Tok::Op(">=")
        ]);
    }

    #[test]
    fn unknown_characters_are_reported() {
        let errs = Lexer::new("a @ b").filter_map(Result::err).collect::<Vec<_>>();
        assert_eq!(errs, vec![(2, 3)]);
    }
}
