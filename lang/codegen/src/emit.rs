use crate::syntax::*;
use lscript_statics::Scope;
use lscript_syntax::*;

pub trait Lower {
    type Out;
    fn lower(&self, em: &Emitter) -> Self::Out;
}

pub struct Emitter {
    pub style: Style,
    hosts: Vec<VarName>,
}

impl Emitter {
    pub fn new(style: Style) -> Self {
        Emitter { style, hosts: Vec::new() }
    }
    /// Names the host provides, left out of the declared globals.
    pub fn host<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.hosts.extend(names.into_iter().map(VarName::from));
        self
    }

    /// Lowers a resolved program. `scope` must be the resolution of `term`.
    pub fn emit(&self, term: &Term, scope: &Scope) -> Program {
        let params = [hook::TOPLEVEL, hook::GUARD, hook::EXECUTE].map(VarName::from).to_vec();
        let globals = scope
            .implicits()
            .map(|binding| binding.name.clone())
            .filter(|name| !hook::ALL.contains(&name.plain()) && !self.hosts.contains(name))
            .collect::<Vec<_>>();
        let body = match self.style {
            | Style::Cps => term.lower(self),
            | Style::Direct => Js::Call {
                callee: Box::new(Js::Var(hook::TOPLEVEL.into())),
                args: vec![term.lower(self)],
            },
        };
        log::debug!("emitted {:?} program with {} declared globals", self.style, globals.len());
        Program { style: self.style, params, globals, body }
    }
}

impl Lower for Term {
    type Out = Js;
    fn lower(&self, em: &Emitter) -> Js {
        match self {
            | Term::Lit(lit) => Js::Lit(lit.clone()),
            | Term::Var(var) => Js::Var(var.name.clone()),
            | Term::Binary(Binary { op, lhs, rhs }) => Js::Binary {
                op: *op,
                lhs: Box::new(lhs.lower(em)),
                rhs: Box::new(rhs.lower(em)),
            },
            | Term::Assign(Assign { target, value }) => {
                Js::Assign { target: target.name.clone(), value: Box::new(value.lower(em)) }
            }
            | Term::Let(Let { binds, body }) => lower_let(binds, body, em),
            | Term::Func(func) => Js::Proc(func.lower(em)),
            | Term::If(If { cond, then, alt }) => Js::Cond {
                cond: Box::new(cond.lower(em)),
                then: Box::new(then.lower(em)),
                alt: Box::new(match alt {
                    | Some(alt) => alt.lower(em),
                    | None => Js::Lit(Literal::Bool(false)),
                }),
            },
            | Term::Seq(Seq(terms)) => match terms.as_slice() {
                | [] => Js::Lit(Literal::Bool(false)),
                | [term] => term.lower(em),
                | terms => Js::Seq(terms.iter().map(|t| t.lower(em)).collect()),
            },
            | Term::Call(Call { callee, args }) => Js::Call {
                callee: Box::new(callee.lower(em)),
                args: args.iter().map(|a| a.lower(em)).collect(),
            },
        }
    }
}

impl Lower for Func {
    type Out = Proc;
    fn lower(&self, em: &Emitter) -> Proc {
        let Func { name, params, locals, body, unguarded, frame: _ } = self;
        let guard = em.style == Style::Cps && !unguarded;
        let name = match name {
            | Some(name) => Some(name.clone()),
            | None if guard => Some(hook::SELF.into()),
            | None => None,
        };
        Proc {
            name,
            params: params.clone(),
            locals: locals.clone(),
            guard,
            body: Box::new(body.lower(em)),
        }
    }
}

/// One immediately applied procedure per binding, so that each
/// initializer sees the bindings before it.
fn lower_let(binds: &[LetBind], body: &Term, em: &Emitter) -> Js {
    let Some((LetBind { name, init, frame: _ }, rest)) = binds.split_first() else {
        return body.lower(em);
    };
    let proc = Proc {
        name: None,
        params: vec![name.clone()],
        locals: Vec::new(),
        guard: false,
        body: Box::new(lower_let(rest, body, em)),
    };
    let init = match init {
        | Some(init) => init.lower(em),
        | None => Js::Lit(Literal::Bool(false)),
    };
    Js::Call { callee: Box::new(Js::Proc(proc)), args: vec![init] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lscript_statics::Resolver;
    use pretty_assertions::assert_eq;
    use unindent::unindent;

    fn emit(style: Style, mut term: Term) -> String {
        let scope = Resolver::default().run(&mut term).unwrap();
        Emitter::new(style).host(["print"]).emit(&term, &scope).to_string()
    }

    #[test]
    fn globals_are_declared_except_hooks_and_host_names() {
        // {counter = 1; print(counter, other); $toplevel(counter)}
        let term = Term::seq(vec![
            Term::assign(Var::new("counter"), Term::num(1.0)),
            Term::call(Term::var("print"), vec![Term::var("counter"), Term::var("other")]),
            Term::call(Term::var(hook::TOPLEVEL), vec![Term::var("counter")]),
        ]);
        let expected = unindent(
            r#"
            (function ($toplevel, $guard, $execute) {
              "use strict";
              var $tmp, counter, other;
              ((counter = 1), print(counter, other), $toplevel(counter));
            })"#,
        );
        assert_eq!(emit(Style::Cps, term), expected);
    }

    #[test]
    fn guards_follow_the_unguarded_flag() {
        let mut loop_ = Func::new(
            Some("loop".into()),
            vec!["K".into()],
            Term::call(Term::var("loop"), vec![Term::var("K")]),
        );
        let anon = Func::new(None, vec!["R".into()], Term::var("R"));
        let term = Term::call(loop_.clone().into(), vec![anon.into()]);
        assert_eq!(
            emit(Style::Cps, term).lines().nth(3).unwrap(),
            "  (function loop(K) { $guard(arguments, loop); return loop(K); })\
             (function $cc(R) { $guard(arguments, $cc); return R; });"
        );
        loop_.unguarded = true;
        let term: Term = loop_.into();
        assert_eq!(
            emit(Style::Cps, term).lines().nth(3).unwrap(),
            "  function loop(K) { return loop(K); };"
        );
    }

    #[test]
    fn direct_style_has_no_checkpoints() {
        let term: Term = Let {
            binds: vec![
                LetBind { name: "a".into(), init: Some(Box::new(Term::num(1.0))), frame: None },
                LetBind { name: "b".into(), init: None, frame: None },
            ],
            body: Box::new(Term::cond(Term::var("b"), Term::var("a"), None)),
        }
        .into();
        assert_eq!(
            emit(Style::Direct, term).lines().nth(3).unwrap(),
            "  $toplevel((function(a) { return (function(b) { return (b !== false ? a : false); })\
             (false); })(1));"
        );
    }
}
