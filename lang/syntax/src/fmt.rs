//! The formatter traits, and their source-like rendering of terms.
//!
//! Terms print in the surface syntax where one exists. Two annotations have
//! no surface form: a function's local-only names print as `var (x, y)`
//! after its parameters, and an unguarded function prints as `func*`.

use crate::*;
use pretty::RcDoc;

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Ugly<'a, Fmter> {
    fn ugly(&self, f: &'a Fmter) -> String;
}

#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Pretty<'a, Fmter> {
    fn pretty(&self, f: &'a Fmter) -> RcDoc<'a>;
}

/* -------------------------------- Formatter ------------------------------- */

pub struct Formatter {
    pub indent: isize,
    pub width: usize,
}
impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}
impl Formatter {
    pub fn new() -> Self {
        Formatter { indent: 2, width: 80 }
    }
    pub fn render<'a>(&self, doc: RcDoc<'a>) -> String {
        doc.pretty(self.width).to_string()
    }
}

fn names(names: &[VarName]) -> String {
    names.iter().map(VarName::plain).collect::<Vec<_>>().join(", ")
}

fn func_head(func: &Func) -> String {
    let Func { name, params, locals, body: _, unguarded, frame: _ } = func;
    let mut s = String::from(if *unguarded { "func*" } else { "func" });
    if let Some(name) = name {
        s += &format!(" {}", name);
    }
    s += &format!("({})", names(params));
    if !locals.is_empty() {
        s += &format!(" var ({})", names(locals));
    }
    s
}

/// Callees that would otherwise swallow the argument list.
fn needs_parens(term: &Term) -> bool {
    matches!(term, Term::Func(_) | Term::If(_) | Term::Let(_) | Term::Assign(_))
}

/* ---------------------------------- Ugly ---------------------------------- */

impl<'a> Ugly<'a, Formatter> for Term {
    fn ugly(&self, f: &'a Formatter) -> String {
        match self {
            | Term::Lit(lit) => lit.to_string(),
            | Term::Var(var) => var.name.to_string(),
            | Term::Binary(Binary { op, lhs, rhs }) => {
                format!("({} {} {})", lhs.ugly(f), op, rhs.ugly(f))
            }
            | Term::Assign(Assign { target, value }) => {
                format!("{} = {}", target.name, value.ugly(f))
            }
            | Term::Let(Let { binds, body }) => {
                let binds = binds
                    .iter()
                    .map(|LetBind { name, init, frame: _ }| match init {
                        | Some(init) => format!("{} = {}", name, init.ugly(f)),
                        | None => name.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("let ({}) {}", binds, body.ugly(f))
            }
            | Term::Func(func) => format!("{} {}", func_head(func), func.body.ugly(f)),
            | Term::If(If { cond, then, alt }) => {
                let mut s = format!("if {} then {}", cond.ugly(f), then.ugly(f));
                if let Some(alt) = alt {
                    s += &format!(" else {}", alt.ugly(f));
                }
                s
            }
            | Term::Seq(Seq(terms)) => {
                let terms = terms.iter().map(|t| t.ugly(f)).collect::<Vec<_>>();
                format!("{{{}}}", terms.join("; "))
            }
            | Term::Call(Call { callee, args }) => {
                let callee = if needs_parens(callee) {
                    format!("({})", callee.ugly(f))
                } else {
                    callee.ugly(f)
                };
                let args = args.iter().map(|a| a.ugly(f)).collect::<Vec<_>>();
                format!("{}({})", callee, args.join(", "))
            }
        }
    }
}

/* --------------------------------- Pretty --------------------------------- */

impl<'a> Pretty<'a, Formatter> for Term {
    fn pretty(&self, f: &'a Formatter) -> RcDoc<'a> {
        match self {
            | Term::Lit(_) | Term::Var(_) => RcDoc::text(self.ugly(f)),
            | Term::Binary(Binary { op, lhs, rhs }) => RcDoc::concat([
                RcDoc::text("("),
                lhs.pretty(f),
                RcDoc::space(),
                RcDoc::text(op.symbol()),
                RcDoc::line(),
                rhs.pretty(f),
                RcDoc::text(")"),
            ])
            .group(),
            | Term::Assign(Assign { target, value }) => RcDoc::concat([
                RcDoc::text(format!("{} =", target.name)),
                RcDoc::concat([RcDoc::line(), value.pretty(f)]).nest(f.indent).group(),
            ]),
            | Term::Let(Let { binds, body }) => {
                let binds = binds.iter().map(|LetBind { name, init, frame: _ }| match init {
                    | Some(init) => {
                        RcDoc::text(format!("{} = ", name)).append(init.pretty(f))
                    }
                    | None => RcDoc::text(name.to_string()),
                });
                RcDoc::concat([
                    RcDoc::text("let ("),
                    RcDoc::intersperse(binds, RcDoc::text(",").append(RcDoc::line())).group(),
                    RcDoc::text(")"),
                    RcDoc::concat([RcDoc::line(), body.pretty(f)]).nest(f.indent),
                ])
                .group()
            }
            | Term::Func(func) => RcDoc::concat([
                RcDoc::text(func_head(func)),
                RcDoc::concat([RcDoc::line(), func.body.pretty(f)]).nest(f.indent),
            ])
            .group(),
            | Term::If(If { cond, then, alt }) => {
                let mut doc = RcDoc::concat([
                    RcDoc::text("if "),
                    cond.pretty(f),
                    RcDoc::concat([RcDoc::line(), RcDoc::text("then "), then.pretty(f)])
                        .nest(f.indent),
                ]);
                if let Some(alt) = alt {
                    doc = doc.append(
                        RcDoc::concat([RcDoc::line(), RcDoc::text("else "), alt.pretty(f)])
                            .nest(f.indent),
                    );
                }
                doc.group()
            }
            | Term::Seq(Seq(terms)) if terms.is_empty() => RcDoc::text("{}"),
            | Term::Seq(Seq(terms)) => RcDoc::concat([
                RcDoc::text("{"),
                RcDoc::concat([
                    RcDoc::line(),
                    RcDoc::intersperse(
                        terms.iter().map(|t| t.pretty(f)),
                        RcDoc::text(";").append(RcDoc::line()),
                    ),
                ])
                .nest(f.indent),
                RcDoc::line(),
                RcDoc::text("}"),
            ])
            .group(),
            | Term::Call(Call { callee, args }) => {
                let callee = if needs_parens(callee) {
                    RcDoc::text("(").append(callee.pretty(f)).append(RcDoc::text(")"))
                } else {
                    callee.pretty(f)
                };
                RcDoc::concat([
                    callee,
                    RcDoc::text("("),
                    RcDoc::concat([
                        RcDoc::line_(),
                        RcDoc::intersperse(
                            args.iter().map(|a| a.pretty(f)),
                            RcDoc::text(",").append(RcDoc::line()),
                        ),
                    ])
                    .nest(f.indent),
                    RcDoc::line_(),
                    RcDoc::text(")"),
                ])
                .group()
            }
        }
    }
}
