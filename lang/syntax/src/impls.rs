use crate::*;
use std::fmt;

impl VarName {
    pub fn plain(&self) -> &str {
        &self.0
    }
}
impl From<&str> for VarName {
    fn from(name: &str) -> Self {
        VarName(name.to_string())
    }
}
impl From<String> for VarName {
    fn from(name: String) -> Self {
        VarName(name)
    }
}
impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Var {
    pub fn new(name: impl Into<VarName>) -> Self {
        Var { name: name.into(), site: None }
    }
}

impl Func {
    pub fn new(name: Option<VarName>, params: Vec<VarName>, body: Term) -> Self {
        Func { name, params, locals: Vec::new(), body: Box::new(body), unguarded: false, frame: None }
    }
}

impl Term {
    /// The canonical false literal.
    pub const FALSE: Term = Term::Lit(Literal::Bool(false));

    pub fn num(n: f64) -> Self {
        Literal::Num(n).into()
    }
    pub fn str(s: impl Into<String>) -> Self {
        Literal::Str(s.into()).into()
    }
    pub fn bool(b: bool) -> Self {
        Literal::Bool(b).into()
    }
    pub fn var(name: impl Into<VarName>) -> Self {
        Var::new(name).into()
    }
    pub fn binary(op: BinOp, lhs: Term, rhs: Term) -> Self {
        Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }.into()
    }
    pub fn assign(target: Var, value: Term) -> Self {
        Assign { target, value: Box::new(value) }.into()
    }
    pub fn call(callee: Term, args: Vec<Term>) -> Self {
        Call { callee: Box::new(callee), args }.into()
    }
    pub fn cond(cond: Term, then: Term, alt: Option<Term>) -> Self {
        If { cond: Box::new(cond), then: Box::new(then), alt: alt.map(Box::new) }.into()
    }
    pub fn seq(terms: Vec<Term>) -> Self {
        Seq(terms).into()
    }
    /// A literal false in place of a missing operand.
    pub fn or_false(term: Option<Box<Term>>) -> Term {
        term.map(|t| *t).unwrap_or(Term::FALSE)
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Term::Lit(_) | Term::Var(_))
    }
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            | Term::Lit(lit) => Some(lit),
            | _ => None,
        }
    }
    /// Variant name, used in diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            | Term::Lit(_) => "literal",
            | Term::Var(_) => "variable",
            | Term::Binary(_) => "binary",
            | Term::Assign(_) => "assignment",
            | Term::Let(_) => "let",
            | Term::Func(_) => "function",
            | Term::If(_) => "conditional",
            | Term::Seq(_) => "sequence",
            | Term::Call(_) => "call",
        }
    }
}

impl Literal {
    pub fn kind(&self) -> &'static str {
        match self {
            | Literal::Num(_) => "number",
            | Literal::Str(_) => "string",
            | Literal::Bool(_) => "boolean",
        }
    }
    /// Only the false literal is falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Literal::Bool(false))
    }
    /// The value as the program would print it; strings are not quoted.
    pub fn show(&self) -> String {
        match self {
            | Literal::Num(n) => show_num(*n),
            | Literal::Str(s) => s.clone(),
            | Literal::Bool(b) => b.to_string(),
        }
    }
}

pub fn show_num(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        // `{}` already drops the fraction of integral values
        format!("{}", n)
    }
}

/// Escapes a string into a double-quoted literal.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            | '"' => out.push_str("\\\""),
            | '\\' => out.push_str("\\\\"),
            | '\n' => out.push_str("\\n"),
            | '\t' => out.push_str("\\t"),
            | '\r' => out.push_str("\\r"),
            | c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            | c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Literal::Str(s) => write!(f, "{}", quote_str(s)),
            | lit => write!(f, "{}", lit.show()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ugly(&Formatter::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_show_like_the_backend() {
        assert_eq!(show_num(14.0), "14");
        assert_eq!(show_num(-0.5), "-0.5");
        assert_eq!(show_num(1.0 / 0.0), "Infinity");
        assert_eq!(show_num(f64::NAN), "NaN");
    }

    #[test]
    fn strings_quote_and_escape() {
        assert_eq!(Literal::Str("a\"b\n".into()).to_string(), r#""a\"b\n""#);
        assert_eq!(Literal::Str("a\"b".into()).show(), "a\"b");
    }

    #[test]
    fn truthiness_is_only_false() {
        assert!(Literal::Num(0.0).is_truthy());
        assert!(Literal::Str(String::new()).is_truthy());
        assert!(!Literal::Bool(false).is_truthy());
    }
}
