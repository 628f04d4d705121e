//! Resolves every name of a generated program to a frame address.

use crate::syntax::*;
use lscript_codegen as cg;
use lscript_syntax::{VarName, hook};
use std::{collections::HashMap, rc::Rc};

pub trait Link {
    type Out;
    fn link(&self, linker: &mut Linker, env: &Layout) -> Self::Out;
}

/// Where every visible name lives, by nesting level.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    names: im::HashMap<VarName, (usize, usize)>,
    level: usize,
}

pub struct Linker {
    host: Vec<(VarName, Value)>,
    hosted: HashMap<VarName, usize>,
}

impl Linker {
    fn new(prelude: impl IntoIterator<Item = (VarName, Value)>) -> Self {
        let host = prelude.into_iter().collect::<Vec<_>>();
        let hosted = host.iter().enumerate().map(|(i, (name, _))| (name.clone(), i)).collect();
        Linker { host, hosted }
    }

    /// Names no frame declares land in the host frame as `undefined`.
    fn resolve(&mut self, env: &Layout, name: &VarName) -> Addr {
        if let Some(&(level, slot)) = env.names.get(name) {
            return Addr { depth: env.level - level, slot };
        }
        let slot = match self.hosted.get(name) {
            | Some(&slot) => slot,
            | None => {
                log::debug!("`{}` is provided by neither the program nor the prelude", name);
                let slot = self.host.len();
                self.host.push((name.clone(), Value::Undefined));
                self.hosted.insert(name.clone(), slot);
                slot
            }
        };
        Addr { depth: env.level, slot }
    }

    /// Lays out a new frame under `env`.
    fn frame(
        &mut self, env: &Layout, name: Option<&VarName>, params: &[VarName], locals: &[VarName],
    ) -> (Layout, usize) {
        let level = env.level + 1;
        let mut names = env.names.clone();
        let mut size = 0;
        let mut declare = |name: &VarName| {
            names.insert(name.clone(), (level, size));
            size += 1;
        };
        if let Some(name) = name {
            declare(name);
        }
        params.iter().for_each(&mut declare);
        // a local named like a parameter is that parameter
        locals.iter().filter(|local| !params.contains(*local)).for_each(&mut declare);
        (Layout { names, level }, size)
    }
}

pub fn link(program: &cg::Program, prelude: impl IntoIterator<Item = (VarName, Value)>) -> Loaded {
    let cg::Program { style, params, globals, body } = program;
    let mut linker = Linker::new(prelude);
    let locals = std::iter::once(VarName::from(hook::TMP)).chain(globals.iter().cloned());
    let locals = locals.collect::<Vec<_>>();
    let (env, size) = linker.frame(&Layout::default(), None, params, &locals);
    let body = body.link(&mut linker, &env);
    let entry = Rc::new(Proc { name: None, named: false, arity: params.len(), size, guard: None, body });
    log::debug!("linked program with {} host names", linker.host.len());
    Loaded { style: *style, entry, host: linker.host }
}

impl Link for cg::Proc {
    type Out = Rc<Proc>;
    fn link(&self, linker: &mut Linker, env: &Layout) -> Rc<Proc> {
        let cg::Proc { name, params, locals, guard, body } = self;
        let guard = guard.then(|| linker.resolve(env, &VarName::from(hook::GUARD)));
        let (inner, size) = linker.frame(env, name.as_ref(), params, locals);
        let body = body.link(linker, &inner);
        let named = name.is_some();
        Rc::new(Proc { name: name.clone(), named, arity: params.len(), size, guard, body })
    }
}

impl Link for cg::Js {
    type Out = Expr;
    fn link(&self, linker: &mut Linker, env: &Layout) -> Expr {
        use cg::Js;
        match self {
            | Js::Lit(lit) => Expr::Const(lit.clone().into()),
            | Js::Var(name) => Expr::Load(linker.resolve(env, name)),
            | Js::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: Box::new(lhs.link(linker, env)),
                rhs: Box::new(rhs.link(linker, env)),
            },
            | Js::Assign { target, value } => {
                let value = Box::new(value.link(linker, env));
                Expr::Store { target: linker.resolve(env, target), value }
            }
            | Js::Proc(proc) => Expr::Proc(proc.link(linker, env)),
            | Js::Cond { cond, then, alt } => Expr::Cond {
                cond: Box::new(cond.link(linker, env)),
                then: Box::new(then.link(linker, env)),
                alt: Box::new(alt.link(linker, env)),
            },
            | Js::Seq(terms) => Expr::Seq(terms.iter().map(|t| t.link(linker, env)).collect()),
            | Js::Call { callee, args } => Expr::Call {
                callee: Box::new(callee.link(linker, env)),
                args: args.iter().map(|a| a.link(linker, env)).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use lscript_codegen::{Js, Style};

    fn var(name: &str) -> Js {
        Js::Var(name.into())
    }

    #[test]
    fn names_resolve_to_depth_and_slot() {
        // (function ($toplevel, $guard, $execute) { var $tmp, g;
        //   function f(x) { var y; return print(x, y, g, mystery); } })
        let body = Js::Call {
            callee: Box::new(var("print")),
            args: vec![var("x"), var("y"), var("g"), var("mystery")],
        };
        let proc = cg::Proc {
            name: Some("f".into()),
            params: vec!["x".into()],
            locals: vec!["y".into(), "x".into()],
            guard: true,
            body: Box::new(body),
        };
        let program = cg::Program {
            style: Style::Cps,
            params: ["$toplevel", "$guard", "$execute"].map(VarName::from).to_vec(),
            globals: vec!["g".into()],
            body: Js::Proc(proc),
        };
        let loaded = link(&program, builtin::prelude(Style::Cps));
        assert_eq!(loaded.entry.size, 5);
        let Expr::Proc(f) = &loaded.entry.body else { panic!("expected a procedure") };
        assert_eq!((f.named, f.arity, f.size), (true, 1, 3));
        assert_eq!(f.guard, Some(Addr { depth: 0, slot: 1 }));
        let Expr::Call { callee, args } = &f.body else { panic!("expected a call") };
        assert!(matches!(**callee, Expr::Load(Addr { depth: 2, slot: 0 })));
        let addrs = args
            .iter()
            .map(|arg| match arg {
                | Expr::Load(addr) => (addr.depth, addr.slot),
                | _ => panic!("expected a load"),
            })
            .collect::<Vec<_>>();
        assert_eq!(addrs, vec![(0, 1), (0, 2), (1, 4), (2, 2)]);
        let host = loaded.host.iter().map(|(name, _)| name.plain()).collect::<Vec<_>>();
        assert_eq!(host, vec!["print", "println", "mystery"]);
    }
}
