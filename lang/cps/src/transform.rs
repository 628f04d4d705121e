//! Conversion to continuation-passing style.
//!
//! Every function gains a leading continuation parameter and every call
//! passes one. The meta-level continuation threaded through [`Transformer::cps`]
//! receives the atomic value of the term just converted and builds the rest
//! of the program around it.

use crate::effects::has_side_effects;
use lscript_syntax::*;
use lscript_utils::gensym::Gensym;

/// Builds the output term once the value of the converted term is known.
pub type Kont<'k, 's> = Box<dyn FnOnce(&mut Transformer<'s>, Term) -> Term + 'k>;

fn kont<'k, 's>(f: impl FnOnce(&mut Transformer<'s>, Term) -> Term + 'k) -> Kont<'k, 's> {
    Box::new(f)
}

pub struct Transformer<'s> {
    sym: &'s mut Gensym,
}

impl<'s> Transformer<'s> {
    pub fn new(sym: &'s mut Gensym) -> Self {
        Transformer { sym }
    }

    /// Converts a whole program; `top` receives its final value.
    pub fn run(&mut self, term: Term, top: impl FnOnce(Term) -> Term) -> Term {
        let before = self.sym.count();
        let out = self.cps(term, kont(move |_, value| top(value)));
        log::debug!("cps introduced {} names", self.sym.count() - before);
        out
    }

    /// Converts a program whose result goes to the host's result sink.
    pub fn toplevel(&mut self, term: Term) -> Term {
        self.run(term, |value| Term::call(Term::var(hook::TOPLEVEL), vec![value]))
    }

    pub fn cps<'k>(&mut self, term: Term, k: Kont<'k, 's>) -> Term {
        match term {
            | Term::Lit(_) | Term::Var(_) => k(self, term),
            | Term::Binary(Binary { op, lhs, rhs }) => self.cps(
                *lhs,
                kont(move |t, lhs| {
                    t.cps(*rhs, kont(move |t, rhs| k(t, Term::binary(op, lhs, rhs))))
                }),
            ),
            | Term::Assign(Assign { target, value }) => {
                self.cps(*value, kont(move |t, value| k(t, Term::assign(target, value))))
            }
            | Term::Let(Let { mut binds, body }) => {
                if binds.is_empty() {
                    return self.cps(*body, k);
                }
                // the first binding becomes a one-parameter function applied
                // to its initializer; the rest nest inside its body
                let LetBind { name, init, frame: _ } = binds.remove(0);
                let rest = Let { binds, body };
                let func = Func::new(None, vec![name], rest.into());
                self.cps(Term::call(func.into(), vec![Term::or_false(init)]), k)
            }
            | Term::Func(func) => {
                let func = self.func(func);
                k(self, func.into())
            }
            | Term::If(If { cond, then, alt }) => self.cps(
                *cond,
                kont(move |t, cond| {
                    let join = t.sym.fresh("I");
                    let rejoin = t.reify(k);
                    let then = t.cps(*then, jump(&join));
                    let alt = t.cps(Term::or_false(alt), jump(&join));
                    let body = Term::cond(cond, then, Some(alt));
                    Term::call(Func::new(None, vec![join.into()], body).into(), vec![rejoin])
                }),
            ),
            | Term::Call(Call { callee, args }) => self.cps(
                *callee,
                kont(move |t, callee| {
                    let ret = t.reify(k);
                    t.args(args.into_iter(), vec![ret], callee)
                }),
            ),
            | Term::Seq(Seq(terms)) => self.seq(terms.into_iter(), k),
        }
    }

    fn func(&mut self, func: Func) -> Func {
        let Func { name, params, locals, body, unguarded, frame: _ } = func;
        let cont = self.sym.fresh("K");
        let body = self.cps(*body, jump(&cont));
        let params = std::iter::once(VarName::from(cont)).chain(params).collect();
        Func { name, params, locals, body: Box::new(body), unguarded, frame: None }
    }

    /// Turns the meta-level continuation into a one-parameter function.
    fn reify<'k>(&mut self, k: Kont<'k, 's>) -> Term {
        let ret = self.sym.fresh("R");
        let body = k(self, Term::var(ret.as_str()));
        Func::new(None, vec![ret.into()], body).into()
    }

    fn args(
        &mut self, mut rest: std::vec::IntoIter<Term>, mut done: Vec<Term>, callee: Term,
    ) -> Term {
        match rest.next() {
            | None => Term::call(callee, done),
            | Some(arg) => self.cps(
                arg,
                kont(move |t, arg| {
                    done.push(arg);
                    t.args(rest, done, callee)
                }),
            ),
        }
    }

    fn seq<'k>(&mut self, mut rest: std::vec::IntoIter<Term>, k: Kont<'k, 's>) -> Term {
        let Some(first) = rest.next() else {
            return k(self, Term::FALSE);
        };
        if rest.len() == 0 {
            return self.cps(first, k);
        }
        if !has_side_effects(&first) {
            return self.seq(rest, k);
        }
        self.cps(
            first,
            kont(move |t, value| {
                if has_side_effects(&value) {
                    let rest = t.seq(rest, k);
                    Term::seq(vec![value, rest])
                } else {
                    t.seq(rest, k)
                }
            }),
        )
    }
}

/// Passes the value on to the continuation variable `name`.
fn jump<'k, 's>(name: &str) -> Kont<'k, 's> {
    let name = name.to_owned();
    kont(move |_, value| Term::call(Term::var(name), vec![value]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cps(term: Term) -> String {
        let mut sym = Gensym::new();
        Transformer::new(&mut sym).toplevel(term).to_string()
    }

    #[test]
    fn atoms_go_straight_to_the_continuation() {
        assert_eq!(cps(Term::num(1.0)), "$toplevel(1)");
        let sum = Term::binary(BinOp::Add, Term::var("a"), Term::num(2.0));
        assert_eq!(cps(sum), "$toplevel((a + 2))");
        assert_eq!(cps(Term::seq(vec![])), "$toplevel(false)");
    }

    #[test]
    fn calls_receive_a_reified_continuation() {
        let term = Term::call(Term::var("f"), vec![Term::num(1.0)]);
        assert_eq!(cps(term), "f(func(R$1) $toplevel(R$1), 1)");
        // nested calls are evaluated first and bound to return parameters
        let term = Term::call(
            Term::var("f"),
            vec![Term::call(Term::var("g"), vec![]), Term::var("x")],
        );
        assert_eq!(cps(term), "g(func(R$2) f(func(R$1) $toplevel(R$1), R$2, x))");
    }

    #[test]
    fn functions_take_their_continuation_first() {
        let func = Func::new(
            Some("id".into()),
            vec!["x".into()],
            Term::var("x"),
        );
        assert_eq!(cps(func.into()), "$toplevel(func id(K$1, x) K$1(x))");
    }

    #[test]
    fn conditionals_join_through_a_shared_continuation() {
        let term = Term::cond(Term::var("c"), Term::num(1.0), None);
        assert_eq!(
            cps(term),
            "(func(I$1) if c then I$1(1) else I$1(false))(func(R$2) $toplevel(R$2))"
        );
    }

    #[test]
    fn let_becomes_nested_applications() {
        let term: Term = Let {
            binds: vec![
                LetBind { name: "a".into(), init: Some(Box::new(Term::num(1.0))), frame: None },
                LetBind { name: "b".into(), init: None, frame: None },
            ],
            body: Box::new(Term::var("b")),
        }
        .into();
        assert_eq!(
            cps(term),
            "(func(K$1, a) (func(K$2, b) K$2(b))(func(R$3) K$1(R$3), false))\
             (func(R$4) $toplevel(R$4), 1)"
        );
    }

    #[test]
    fn pure_statements_are_dropped() {
        let term = Term::seq(vec![
            Term::num(1.0),
            Term::assign(Var::new("x"), Term::num(2.0)),
            Term::var("x"),
            Term::var("x"),
        ]);
        assert_eq!(cps(term), "{x = 2; $toplevel(x)}");
    }
}
