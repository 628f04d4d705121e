//! Fixed-point rewriting of continuation-passing programs.
//!
//! Each pass re-resolves the program and applies at most one rewrite; once
//! a rewrite fires the rest of the tree is handed back untouched, because
//! the usage counts it was decided with are now stale. Passes repeat until
//! one of them changes nothing.

use crate::{
    effects::has_side_effects,
    err::{OptimizeError, Result},
};
use lscript_statics::{Resolver, Scope};
use lscript_syntax::*;
use lscript_utils::gensym::Gensym;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Optimized {
    pub term: Term,
    /// resolution of `term`
    pub scope: Scope,
    pub passes: usize,
    pub rewrites: usize,
}

pub struct Optimizer<'s> {
    sym: &'s mut Gensym,
}

impl<'s> Optimizer<'s> {
    pub fn new(sym: &'s mut Gensym) -> Self {
        Optimizer { sym }
    }

    pub fn run(&mut self, term: Term) -> Result<Optimized> {
        let mut term = term;
        let (mut passes, mut rewrites) = (0, 0);
        loop {
            let scope = Resolver::default().run(&mut term)?;
            let mut pass = Pass {
                scope: &scope,
                sym: &mut *self.sym,
                changes: 0,
                renames: HashMap::new(),
                defuns: Vec::new(),
            };
            term = pass.opt(term)?;
            let Pass { changes, renames, .. } = pass;
            rename(&mut term, &renames);
            passes += 1;
            rewrites += changes;
            log::debug!("pass {}: {} rewrite(s)", passes, changes);
            if changes == 0 {
                break;
            }
        }
        let scope = Resolver::default().run(&mut term)?;
        log::debug!("optimizer settled after {} passes, {} rewrites", passes, rewrites);
        Ok(Optimized { term, scope, passes, rewrites })
    }
}

/// The function whose body is being optimized.
struct Defun {
    frame: FrameId,
    /// names moved in from inlined functions during this pass
    hoisted: Vec<VarName>,
}

struct Pass<'a> {
    scope: &'a Scope,
    sym: &'a mut Gensym,
    changes: usize,
    /// new names for variable sites, applied once the pass is over
    renames: HashMap<SiteId, VarName>,
    defuns: Vec<Defun>,
}

impl Pass<'_> {
    fn changed(&mut self) {
        self.changes += 1;
    }

    fn opt(&mut self, term: Term) -> Result<Term> {
        if self.changes > 0 {
            return Ok(term);
        }
        match term {
            | Term::Lit(_) | Term::Var(_) => Ok(term),
            | Term::Binary(binary) => self.binary(binary),
            | Term::Assign(assign) => self.assign(assign),
            | Term::Let(_) => Err(OptimizeError::Malformed { tag: "let" }),
            | Term::Func(func) => self.func(func, false),
            | Term::If(cond) => self.cond(cond),
            | Term::Seq(Seq(terms)) => self.seq(terms),
            | Term::Call(call) => self.call(call),
        }
    }

    fn binary(&mut self, Binary { op, lhs, rhs }: Binary) -> Result<Term> {
        let lhs = self.opt(*lhs)?;
        let rhs = self.opt(*rhs)?;
        if let (Some(l), Some(r)) = (lhs.as_literal(), rhs.as_literal()) {
            match op.fold(l, r) {
                | Ok(lit) => {
                    self.changed();
                    return Ok(lit.into());
                }
                | Err(OpError::DivisionByZero) => {
                    let expr = Term::binary(op, lhs, rhs).to_string();
                    return Err(OptimizeError::DivisionByZero { expr });
                }
                // left for the runtime to report
                | Err(OpError::Mismatch { .. }) => {}
            }
        }
        Ok(Term::binary(op, lhs, rhs))
    }

    fn assign(&mut self, Assign { target, value }: Assign) -> Result<Term> {
        let scope = self.scope;
        if let Some(binding) = scope.resolved(&target) {
            let local = !scope.is_root(binding.frame);
            if let Term::Var(source) = value.as_ref() {
                let cont = scope.resolved(source).is_some_and(|b| b.cont);
                if cont && local && binding.assigned == 1 {
                    log::trace!("propagating `{}` into `{}`", source.name, target.name);
                    for site in &binding.refs {
                        self.renames.insert(*site, source.name.clone());
                    }
                    self.changed();
                    return self.opt(*value);
                }
            }
            if local && binding.is_dead_store() {
                log::trace!("dropping dead store to `{}`", target.name);
                self.changed();
                return self.opt(*value);
            }
        }
        let value = self.opt(*value)?;
        Ok(Term::assign(target, value))
    }

    fn cond(&mut self, If { cond, then, alt }: If) -> Result<Term> {
        let cond = self.opt(*cond)?;
        let then = self.opt(*then)?;
        let alt = self.opt(Term::or_false(alt))?;
        if let Some(lit) = cond.as_literal() {
            self.changed();
            return Ok(if lit.is_truthy() { then } else { alt });
        }
        Ok(Term::cond(cond, then, Some(alt)))
    }

    fn seq(&mut self, mut terms: Vec<Term>) -> Result<Term> {
        match terms.len() {
            | 0 => {
                self.changed();
                Ok(Term::FALSE)
            }
            | 1 => {
                self.changed();
                self.opt(terms.remove(0))
            }
            | _ if !has_side_effects(&terms[0]) => {
                self.changed();
                terms.remove(0);
                self.opt(Term::seq(terms))
            }
            | 2 => {
                let terms = terms.into_iter().map(|t| self.opt(t)).collect::<Result<_>>()?;
                Ok(Term::seq(terms))
            }
            | _ => {
                // right-nest into pairs
                let rest = terms.split_off(1);
                terms.push(Term::seq(rest));
                self.opt(Term::seq(terms))
            }
        }
    }

    fn call(&mut self, Call { callee, args }: Call) -> Result<Term> {
        let callee = match *callee {
            | Term::Func(func) if func.name.is_none() => {
                let scope = self.scope;
                let nested = func
                    .frame
                    .and_then(|frame| scope.parent(frame))
                    .is_some_and(|parent| !scope.is_root(parent));
                if nested && !self.defuns.is_empty() {
                    return self.inline(func, args);
                }
                // runs once, straight from the top level
                self.func(func, true)?
            }
            | callee => self.opt(callee)?,
        };
        let args = args.into_iter().map(|arg| self.opt(arg)).collect::<Result<_>>()?;
        Ok(Term::call(callee, args))
    }

    /// Replaces an immediately applied function by assignments to its
    /// parameters followed by its body.
    fn inline(&mut self, func: Func, args: Vec<Term>) -> Result<Term> {
        self.changed();
        let Func { name: _, params, locals, body, unguarded: _, frame } = func;
        log::trace!("inlining a function of {} parameter(s)", params.len());
        let locals = locals.into_iter().filter(|l| !params.contains(l)).collect::<Vec<_>>();
        let mut args = args.into_iter();
        let mut terms = Vec::new();
        for param in params {
            let name = self.hoist(frame, &param);
            let arg = args.next().unwrap_or(Term::FALSE);
            terms.push(Term::assign(Var::new(name), arg));
        }
        // surplus arguments are still evaluated
        terms.extend(args);
        for local in locals {
            self.hoist(frame, &local);
        }
        terms.push(*body);
        Ok(Term::seq(terms))
    }

    /// Moves `name` out of the inlined frame `from` into the enclosing
    /// function, renaming it if it would capture or collide.
    fn hoist(&mut self, from: Option<FrameId>, name: &VarName) -> VarName {
        let scope = self.scope;
        let Some(defun) = self.defuns.last_mut() else {
            return name.clone();
        };
        let taken = scope.visible(defun.frame, name) || defun.hoisted.contains(name);
        let fresh = if taken { VarName::from(self.sym.fresh(name.plain())) } else { name.clone() };
        defun.hoisted.push(fresh.clone());
        if fresh != *name {
            let binding = from.and_then(|frame| scope.frames[&frame].names.get(name));
            if let Some(binding) = binding {
                for site in &scope.binding(binding).refs {
                    self.renames.insert(*site, fresh.clone());
                }
            }
        }
        fresh
    }

    /// `iife` marks a function applied right where it is defined at the top
    /// level, which needs no checkpoint.
    fn func(&mut self, func: Func, iife: bool) -> Result<Term> {
        let scope = self.scope;
        let Func { name, params, locals, body, unguarded: _, frame } = func;
        if let Some(target) = self.forwards(frame, &params, &body) {
            log::trace!("collapsing a function that only forwards to `{}`", target.name);
            self.changed();
            return Ok(target.into());
        }
        let locals = locals
            .into_iter()
            .filter(|local| match frame.and_then(|f| scope.frames[&f].names.get(local)) {
                | Some(id) => !scope.binding(id).refs.is_empty(),
                | None => true,
            })
            .collect::<Vec<_>>();

        self.defuns.push(Defun { frame: frame.unwrap_or(scope.root), hoisted: Vec::new() });
        let body = self.opt(*body);
        let hoisted = self.defuns.pop().map(|defun| defun.hoisted).unwrap_or_default();
        let body = body?;

        let mut locals = locals;
        locals.extend(hoisted);
        let unguarded = iife || matches!(body, Term::Call(_));
        Ok(Func { name, params, locals, body: Box::new(body), unguarded, frame }.into())
    }

    /// `func(k, x) f(k, x)` where `f` is a fixed, non-global binding from
    /// an enclosing function.
    fn forwards(&self, frame: Option<FrameId>, params: &[VarName], body: &Term) -> Option<Var> {
        let frame = frame?;
        let Term::Call(Call { callee, args }) = body else {
            return None;
        };
        let Term::Var(target) = callee.as_ref() else {
            return None;
        };
        let binding = self.scope.resolved(target)?;
        if binding.assigned > 0 || self.scope.is_root(binding.frame) || binding.frame == frame {
            return None;
        }
        let same = args.len() == params.len()
            && args.iter().zip(params).all(|(arg, param)| {
                matches!(arg, Term::Var(Var { name, site: _ }) if name == param)
            });
        same.then(|| target.clone())
    }
}

/// Applies the renames a pass recorded, by site.
fn rename(term: &mut Term, renames: &HashMap<SiteId, VarName>) {
    if renames.is_empty() {
        return;
    }
    let mut apply = |var: &mut Var| {
        if let Some(name) = var.site.and_then(|site| renames.get(&site)) {
            var.name = name.clone();
        }
    };
    walk_vars(term, &mut apply);
}

fn walk_vars(term: &mut Term, f: &mut impl FnMut(&mut Var)) {
    match term {
        | Term::Lit(_) => {}
        | Term::Var(var) => f(var),
        | Term::Binary(Binary { op: _, lhs, rhs }) => {
            walk_vars(lhs, f);
            walk_vars(rhs, f);
        }
        | Term::Assign(Assign { target, value }) => {
            f(target);
            walk_vars(value, f);
        }
        | Term::Let(Let { binds, body }) => {
            for bind in binds {
                if let Some(init) = &mut bind.init {
                    walk_vars(init, f);
                }
            }
            walk_vars(body, f);
        }
        | Term::Func(func) => walk_vars(&mut func.body, f),
        | Term::If(If { cond, then, alt }) => {
            walk_vars(cond, f);
            walk_vars(then, f);
            if let Some(alt) = alt {
                walk_vars(alt, f);
            }
        }
        | Term::Seq(Seq(terms)) => terms.iter_mut().for_each(|t| walk_vars(t, f)),
        | Term::Call(Call { callee, args }) => {
            walk_vars(callee, f);
            args.iter_mut().for_each(|t| walk_vars(t, f));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transformer;
    use pretty_assertions::assert_eq;

    fn optimize(term: Term) -> Result<Optimized> {
        let mut sym = Gensym::new();
        Optimizer::new(&mut sym).run(term)
    }

    fn show(term: Term) -> String {
        optimize(term).unwrap().term.to_string()
    }

    fn top(term: Term) -> Term {
        Term::call(Term::var(hook::TOPLEVEL), vec![term])
    }

    fn num(n: f64) -> Term {
        Term::num(n)
    }

    #[test]
    fn constants_fold() {
        let term = top(Term::binary(
            BinOp::Add,
            num(2.0),
            Term::binary(BinOp::Mul, num(3.0), num(4.0)),
        ));
        let out = optimize(term).unwrap();
        assert_eq!(out.term.to_string(), "$toplevel(14)");
        assert_eq!((out.passes, out.rewrites), (2, 2));

        let concat = Term::binary(BinOp::Add, Term::str("n = "), num(1.0));
        assert_eq!(show(top(concat)), r#"$toplevel("n = 1")"#);
    }

    #[test]
    fn mismatched_operands_stay_for_the_runtime() {
        let term = top(Term::binary(BinOp::Sub, num(1.0), Term::str("a")));
        assert_eq!(show(term), r#"$toplevel((1 - "a"))"#);
    }

    #[test]
    fn constant_division_by_zero_is_an_error() {
        let term = top(Term::binary(BinOp::Div, num(1.0), num(0.0)));
        assert_eq!(
            optimize(term).unwrap_err(),
            OptimizeError::DivisionByZero { expr: "(1 / 0)".into() }
        );
        let term = top(Term::binary(BinOp::Mod, Term::var("x"), num(0.0)));
        assert!(optimize(term).is_ok());
    }

    #[test]
    fn pure_statements_are_eliminated() {
        let call = |f: &str| Term::call(Term::var(f), vec![]);
        let term = Term::seq(vec![num(1.0), call("bar"), num(2.0), call("foo")]);
        assert_eq!(show(term), "{bar(); foo()}");
        let term = Term::seq(vec![num(1.0), num(2.0), call("foo")]);
        assert_eq!(show(term), "foo()");
        assert_eq!(show(Term::seq(vec![])), "false");
    }

    #[test]
    fn constant_conditions_pick_a_branch() {
        let call = |f: &str| Term::call(Term::var(f), vec![]);
        let term = Term::cond(Term::bool(true), call("a"), Some(call("b")));
        assert_eq!(show(term), "a()");
        // only `false` is falsy
        let term = Term::cond(num(0.0), call("a"), Some(call("b")));
        assert_eq!(show(term), "a()");
        let term = Term::cond(Term::bool(false), call("a"), None);
        assert_eq!(show(term), "false");
    }

    #[test]
    fn let_is_rejected() {
        let term: Term = Let { binds: vec![], body: Box::new(num(1.0)) }.into();
        assert_eq!(optimize(term).unwrap_err(), OptimizeError::Malformed { tag: "let" });
    }

    #[test]
    fn dead_local_stores_are_dropped() {
        // func f(K) var (t) { t = 1; K(2) }
        let mut func = Func::new(
            Some("f".into()),
            vec!["K".into()],
            Term::seq(vec![
                Term::assign(Var::new("t"), num(1.0)),
                Term::call(Term::var("K"), vec![num(2.0)]),
            ]),
        );
        func.locals = vec!["t".into()];
        assert_eq!(show(top(func.into())), "$toplevel(func* f(K) K(2))");
        // globals are observable by the host
        let term = Term::seq(vec![Term::assign(Var::new("g"), num(1.0)), top(num(2.0))]);
        assert_eq!(show(term), "{g = 1; $toplevel(2)}");
    }

    #[test]
    fn inlining_renames_captured_parameters() {
        // func f(K, x) (func(x) K(x))(x + 1)
        let inner = Func::new(
            None,
            vec!["x".into()],
            Term::call(Term::var("K"), vec![Term::var("x")]),
        );
        let outer = Func::new(
            Some("f".into()),
            vec!["K".into(), "x".into()],
            Term::call(
                inner.into(),
                vec![Term::binary(BinOp::Add, Term::var("x"), num(1.0))],
            ),
        );
        assert_eq!(
            show(top(outer.into())),
            "$toplevel(func f(K, x) var (x$1) {x$1 = (x + 1); K(x$1)})"
        );
    }

    #[test]
    fn toplevel_applications_run_unguarded() {
        let body = Term::seq(vec![
            Term::call(Term::var("print"), vec![Term::var("a")]),
            Term::var("a"),
        ]);
        let term = Term::call(Func::new(None, vec!["a".into()], body).into(), vec![num(1.0)]);
        assert_eq!(show(term), "(func*(a) {print(a); a})(1)");
    }

    /// `let loop(i = 1, acc = 0) if i > 1000000 then acc else loop(i + 1, acc + i)`
    fn counting_loop() -> Term {
        let body = Term::cond(
            Term::binary(BinOp::Gt, Term::var("i"), num(1e6)),
            Term::var("acc"),
            Some(Term::call(
                Term::var("loop"),
                vec![
                    Term::binary(BinOp::Add, Term::var("i"), num(1.0)),
                    Term::binary(BinOp::Add, Term::var("acc"), Term::var("i")),
                ],
            )),
        );
        let func = Func::new(Some("loop".into()), vec!["i".into(), "acc".into()], body);
        Term::call(func.into(), vec![num(1.0), num(0.0)])
    }

    #[test]
    fn continuations_collapse_into_tail_calls() {
        let mut sym = Gensym::new();
        let cps = Transformer::new(&mut sym).toplevel(counting_loop());
        let out = Optimizer::new(&mut sym).run(cps).unwrap();
        assert_eq!(
            out.term.to_string(),
            "(func loop(K$1, i, acc) if (i > 1000000) then K$1(acc) \
             else loop(K$1, (i + 1), (acc + i)))(func*(R$5) $toplevel(R$5), 1, 0)"
        );
    }

    #[test]
    fn output_is_a_fixed_point() {
        let mut sym = Gensym::new();
        let cps = Transformer::new(&mut sym).toplevel(counting_loop());
        let once = Optimizer::new(&mut sym).run(cps).unwrap();
        let twice = Optimizer::new(&mut sym).run(once.term.clone()).unwrap();
        assert_eq!(twice.rewrites, 0);
        assert_eq!(twice.passes, 1);
        assert_eq!(twice.term.to_string(), once.term.to_string());
    }
}
