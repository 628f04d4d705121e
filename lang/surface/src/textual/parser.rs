use super::{
    err::{ParseError, Result},
    lexer::{Lexer, Spanned, Tok},
};
use lscript_syntax::*;
use lscript_utils::span::{Cursor2, FileInfo};

/// Binding strength of an infix operator; assignment binds loosest.
fn precedence(op: &str) -> Option<u8> {
    match op {
        | "=" => Some(1),
        | "||" => Some(2),
        | "&&" => Some(3),
        | "<" | ">" | "<=" | ">=" | "==" | "!=" => Some(7),
        | "+" | "-" => Some(10),
        | "*" | "/" | "%" => Some(20),
        | _ => None,
    }
}

/// Deepest term nesting accepted; every later pass recurses on the tree.
pub const MAX_DEPTH: usize = 256;

/// Recursive-descent parser over a pre-lexed token buffer.
pub struct Parser<'src> {
    toks: Vec<Spanned<'src>>,
    pos: usize,
    info: FileInfo,
    len: usize,
    /// open `expression` calls
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Result<Self> {
        let info = FileInfo::new(source);
        let mut toks = Vec::new();
        for tok in Lexer::new(source) {
            match tok {
                | Ok(tok) => toks.push(tok),
                | Err((l, r)) => {
                    let text = source[l..r].to_string();
                    Err(ParseError::UnexpectedChar { text, at: info.trans_span2(l) })?
                }
            }
        }
        Ok(Parser { toks, pos: 0, info, len: source.len(), depth: 0 })
    }

    /// `expr; expr; ...` up to the end of input, always as a sequence.
    pub fn program(mut self) -> Result<Term> {
        let mut terms = Vec::new();
        while self.peek().is_some() {
            let at = self.at();
            let term = self.expression()?;
            // blocks and conditionals are not measured as they are built
            self.within(height(&term) + 1, at)?;
            terms.push(term);
            if self.peek().is_some() {
                self.expect(Tok::Semicolon, "`;`")?;
            }
        }
        Ok(Term::seq(terms))
    }

    /* --------------------------------- Cursor --------------------------------- */

    fn peek(&self) -> Option<&Tok<'src>> {
        self.toks.get(self.pos).map(|(_, tok, _)| tok)
    }
    fn at(&self) -> Cursor2 {
        match self.toks.get(self.pos) {
            | Some((l, _, _)) => self.info.trans_span2(*l),
            | None => self.info.trans_span2(self.len),
        }
    }
    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            | Some(tok) => ParseError::UnexpectedToken {
                found: tok.to_string(),
                expected,
                at: self.at(),
            },
            | None => ParseError::UnexpectedEof { expected, at: self.at() },
        }
    }
    fn eat(&mut self, tok: Tok<'_>) -> bool {
        if self.peek() == Some(&tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
    fn within(&self, height: usize, at: Cursor2) -> Result<()> {
        if height > MAX_DEPTH {
            return Err(ParseError::TooDeep { limit: MAX_DEPTH, at });
        }
        Ok(())
    }
    fn expect(&mut self, tok: Tok<'_>, expected: &'static str) -> Result<()> {
        if self.eat(tok) { Ok(()) } else { Err(self.unexpected(expected)) }
    }
    fn ident(&mut self) -> Result<VarName> {
        match self.peek() {
            | Some(Tok::Ident(name)) => {
                let name = VarName::from(*name);
                self.pos += 1;
                Ok(name)
            }
            | _ => Err(self.unexpected("an identifier")),
        }
    }

    /// `open item sep item sep ... close`, tolerating a trailing separator.
    fn delimited<T>(
        &mut self, open: Tok<'_>, close: Tok<'_>, sep: Tok<'_>, expected: &'static str,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.expect(open, expected)?;
        let mut items = Vec::new();
        let mut first = true;
        loop {
            if self.eat(close.clone()) {
                break;
            }
            if first {
                first = false;
            } else {
                self.expect(sep.clone(), expected)?;
                if self.eat(close.clone()) {
                    break;
                }
            }
            items.push(item(self)?);
        }
        Ok(items)
    }

    /* ------------------------------- Expressions ------------------------------ */

    fn expression(&mut self) -> Result<Term> {
        self.depth += 1;
        self.within(self.depth, self.at())?;
        let lhs = self.atom()?;
        let term = self.binary(lhs, 0)?;
        self.depth -= 1;
        Ok(term)
    }

    /// Precedence climbing; every operator associates to the left.
    fn binary(&mut self, mut lhs: Term, min: u8) -> Result<Term> {
        let mut tall = height(&lhs);
        loop {
            let Some(Tok::Op(op)) = self.peek() else { return Ok(lhs) };
            let op = *op;
            let at = self.at();
            let Some(prec) = precedence(op) else {
                return Err(ParseError::UnknownOperator { op: op.to_string(), at });
            };
            if prec <= min {
                return Ok(lhs);
            }
            self.pos += 1;
            let rhs = self.atom()?;
            let rhs = self.binary(rhs, prec)?;
            tall = tall.max(height(&rhs)) + 1;
            self.within(self.depth + tall, at)?;
            lhs = if op == "=" {
                match lhs {
                    | Term::Var(target) => Term::assign(target, rhs),
                    | other => Err(ParseError::InvalidAssign { target: other.to_string(), at })?,
                }
            } else {
                let Some(bin) = BinOp::from_symbol(op) else {
                    return Err(ParseError::UnknownOperator { op: op.to_string(), at });
                };
                Term::binary(bin, lhs, rhs)
            };
        }
    }

    fn atom(&mut self) -> Result<Term> {
        let mut term = self.atom_head()?;
        let mut tall = height(&term);
        while self.peek() == Some(&Tok::ParenOpen) {
            let at = self.at();
            let args = self.delimited(
                Tok::ParenOpen,
                Tok::ParenClose,
                Tok::Comma,
                "an argument list",
                Self::expression,
            )?;
            tall = args.iter().map(height).fold(tall, usize::max) + 1;
            self.within(self.depth + tall, at)?;
            term = Term::call(term, args);
        }
        Ok(term)
    }

    fn atom_head(&mut self) -> Result<Term> {
        match self.peek() {
            | Some(Tok::ParenOpen) => {
                self.pos += 1;
                let term = self.expression()?;
                self.expect(Tok::ParenClose, "`)`")?;
                Ok(term)
            }
            | Some(Tok::BraceOpen) => self.block(),
            | Some(Tok::If) => self.conditional(),
            | Some(Tok::True) => {
                self.pos += 1;
                Ok(Term::bool(true))
            }
            | Some(Tok::False) => {
                self.pos += 1;
                Ok(Term::bool(false))
            }
            | Some(Tok::Func) => {
                self.pos += 1;
                Ok(self.function()?.into())
            }
            | Some(Tok::Let) => self.binding(),
            | Some(Tok::Ident(_)) => Ok(Term::Var(Var::new(self.ident()?))),
            | Some(Tok::NumLit(text)) => {
                let text = text.to_string();
                let at = self.at();
                self.pos += 1;
                let n = text.parse::<f64>().map_err(|_| ParseError::BadNumber { text, at })?;
                Ok(Term::num(n))
            }
            | Some(Tok::StrLit(text)) => {
                let s = unescape(text);
                self.pos += 1;
                Ok(Term::str(s))
            }
            | _ => Err(self.unexpected("an expression")),
        }
    }

    /// `{}` is false, `{a}` is `a`, anything longer is a sequence.
    fn block(&mut self) -> Result<Term> {
        let mut terms = self.delimited(
            Tok::BraceOpen,
            Tok::BraceClose,
            Tok::Semicolon,
            "a block",
            Self::expression,
        )?;
        Ok(match terms.len() {
            | 0 => Term::FALSE,
            | 1 => terms.remove(0),
            | _ => Term::seq(terms),
        })
    }

    /// `if cond [then] a [else b]`; `then` may only be left out before `{`.
    fn conditional(&mut self) -> Result<Term> {
        self.expect(Tok::If, "`if`")?;
        let cond = self.expression()?;
        if self.peek() != Some(&Tok::BraceOpen) {
            self.expect(Tok::Then, "`then`")?;
        }
        let then = self.expression()?;
        let alt = if self.eat(Tok::Else) { Some(self.expression()?) } else { None };
        Ok(Term::cond(cond, then, alt))
    }

    /// `[name](params) body`, after the `func` keyword.
    fn function(&mut self) -> Result<Func> {
        let name = match self.peek() {
            | Some(Tok::Ident(_)) => Some(self.ident()?),
            | _ => None,
        };
        let params = self.delimited(
            Tok::ParenOpen,
            Tok::ParenClose,
            Tok::Comma,
            "a parameter list",
            Self::ident,
        )?;
        let body = self.expression()?;
        Ok(Func::new(name, params, body))
    }

    /// `let (a = 1, b) body`, or the named form `let name(a = 1, b) body`,
    /// which calls a self-recursive function with the initial values.
    fn binding(&mut self) -> Result<Term> {
        self.expect(Tok::Let, "`let`")?;
        let name = match self.peek() {
            | Some(Tok::Ident(_)) => Some(self.ident()?),
            | _ => None,
        };
        let binds = self.delimited(
            Tok::ParenOpen,
            Tok::ParenClose,
            Tok::Comma,
            "a binding list",
            |p| {
                let name = p.ident()?;
                let init = match p.peek() {
                    | Some(Tok::Op("=")) => {
                        p.pos += 1;
                        Some(Box::new(p.expression()?))
                    }
                    | _ => None,
                };
                Ok(LetBind { name, init, frame: None })
            },
        )?;
        let body = self.expression()?;
        match name {
            | Some(name) => {
                let (params, inits): (Vec<_>, Vec<_>) =
                    binds.into_iter().map(|bind| (bind.name, Term::or_false(bind.init))).unzip();
                Ok(Term::call(Func::new(Some(name), params, body).into(), inits))
            }
            | None => Ok(Let { binds, body: Box::new(body) }.into()),
        }
    }
}

/// Strips the quotes; `\n`, `\t` and `\r` are control characters and any
/// other escaped character stands for itself.
fn unescape(lit: &str) -> String {
    let inner = &lit[1..lit.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            | Some('n') => out.push('\n'),
            | Some('t') => out.push('\t'),
            | Some('r') => out.push('\r'),
            | Some(c) => out.push(c),
            | None => {}
        }
    }
    out
}

/// Nesting depth of `term`, measured without recursion.
fn height(term: &Term) -> usize {
    let mut max = 0;
    let mut stack = vec![(term, 1)];
    while let Some((term, depth)) = stack.pop() {
        max = max.max(depth);
        stack.extend(children(term).into_iter().map(|t| (t, depth + 1)));
    }
    max
}

fn children(term: &Term) -> Vec<&Term> {
    match term {
        | Term::Lit(_) | Term::Var(_) => vec![],
        | Term::Binary(Binary { op: _, lhs, rhs }) => vec![&**lhs, &**rhs],
        | Term::Assign(Assign { target: _, value }) => vec![&**value],
        | Term::Let(Let { binds, body }) => binds
            .iter()
            .filter_map(|bind| bind.init.as_deref())
            .chain(std::iter::once(&**body))
            .collect(),
        | Term::Func(func) => vec![&*func.body],
        | Term::If(If { cond, then, alt }) => {
            let mut terms = vec![&**cond, &**then];
            terms.extend(alt.as_deref());
            terms
        }
        | Term::Seq(Seq(terms)) => terms.iter().collect(),
        | Term::Call(Call { callee, args }) => {
            std::iter::once(&**callee).chain(args.iter()).collect()
        }
    }
}

pub fn parse(source: &str) -> Result<Term> {
    Parser::new(source)?.program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ugly(src: &str) -> String {
        parse(src).unwrap().ugly(&Formatter::new())
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(ugly("1 + 2 * 3"), "{(1 + (2 * 3))}");
        assert_eq!(ugly("a - b - c"), "{((a - b) - c)}");
        assert_eq!(ugly("a || b && c == d"), "{(a || (b && (c == d)))}");
        assert_eq!(ugly("x = 1 + 2; x"), "{x = (1 + 2); x}");
    }

    #[test]
    fn blocks() {
        assert_eq!(ugly("{}"), "{false}");
        assert_eq!(ugly("{ 1 }"), "{1}");
        assert_eq!(ugly("{ 1; 2; }"), "{{1; 2}}");
    }

    #[test]
    fn conditionals() {
        assert_eq!(ugly("if a then b else c"), "{if a then b else c}");
        assert_eq!(ugly("if a { b }"), "{if a then b}");
        assert!(parse("if a b").is_err());
    }

    #[test]
    fn functions_and_calls() {
        assert_eq!(ugly("func f(a, b) a + b"), "{func f(a, b) (a + b)}");
        assert_eq!(ugly("f(1)(2, 3)"), "{f(1)(2, 3)}");
        assert_eq!(ugly("(func (x) x)(1)"), "{(func(x) x)(1)}");
    }

    #[test]
    fn lets() {
        assert_eq!(ugly("let (a = 1, b) a"), "{let (a = 1, b) a}");
        assert_eq!(
            ugly("let loop(n = 10) if n == 0 then 0 else loop(n - 1)"),
            "{(func loop(n) if (n == 0) then 0 else loop((n - 1)))(10)}"
        );
        assert_eq!(ugly("let go(n) n"), "{(func go(n) n)(false)}");
    }

    #[test]
    fn strings_unescape() {
        let Term::Seq(Seq(terms)) = parse(r#""a\"b\nc\q""#).unwrap() else { panic!() };
        assert_eq!(terms, vec![Term::str("a\"b\ncq")]);
    }

    #[test]
    fn errors_carry_positions() {
        let err = parse("1 +\n  @").unwrap_err();
        assert_eq!(err.to_string(), "2:3: unexpected character `@`");
        let err = parse("f(1").unwrap_err();
        assert_eq!(err.to_string(), "1:4: unexpected end of input, expected an argument list");
        let err = parse("1 = 2").unwrap_err();
        assert_eq!(err.to_string(), "1:3: cannot assign to `1`");
        let err = parse("1 => 2").unwrap_err();
        assert_eq!(err.to_string(), "1:3: unknown operator `=>`");
    }

    #[test]
    fn nesting_is_bounded() {
        let chain = format!("x = 1; x{}", " + x".repeat(20000));
        assert!(matches!(parse(&chain), Err(ParseError::TooDeep { limit: MAX_DEPTH, .. })));
        let parens = format!("{}1{}", "(".repeat(20000), ")".repeat(20000));
        assert!(matches!(parse(&parens), Err(ParseError::TooDeep { .. })));
        let calls = format!("f{}", "()".repeat(20000));
        assert!(matches!(parse(&calls), Err(ParseError::TooDeep { .. })));
        // a parenthesized chain continued outside its parentheses
        let inner = format!("a{}", " + a".repeat(199));
        assert!(parse(&format!("({}){}", inner, " + a".repeat(100))).is_err());
        assert!(parse(&format!("({}){}", inner, " + a".repeat(20))).is_ok());
        assert!(parse(&format!("x{}", " + x".repeat(200))).is_ok());
    }
}
