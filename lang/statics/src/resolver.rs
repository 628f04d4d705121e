use crate::{
    err::{ResolveError, Result},
    scope::*,
};
use lscript_syntax::*;

/// What to do with a name that no enclosing frame declares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// declare it in the root frame
    #[default]
    Permissive,
    /// like `Permissive`, but reject a global that is never assigned
    /// anywhere and that the host does not provide
    Strict,
}

pub struct Resolver {
    mode: Mode,
    hosts: Vec<VarName>,
    scope: Scope,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl Resolver {
    pub fn new(mode: Mode) -> Self {
        Resolver { mode, hosts: Vec::new(), scope: Scope::new() }
    }
    /// Names the host environment provides.
    pub fn host<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.hosts.extend(names.into_iter().map(VarName::from));
        self
    }

    /// Annotates `term` in place and returns the fresh scope.
    pub fn run(mut self, term: &mut Term) -> Result<Scope> {
        let root = self.scope.root;
        term.resolve(&mut self, root);
        let Resolver { mode, hosts, scope } = self;
        if let Mode::Strict = mode {
            for binding in scope.implicits() {
                if binding.assigned == 0 && !hosts.contains(&binding.name) {
                    log::debug!("rejecting implicit global `{}`", binding.name);
                    Err(ResolveError::Unbound(binding.name.clone()))?
                }
            }
        }
        log::trace!(
            "resolved {} frames, {} bindings, {} sites",
            scope.frames.len(),
            scope.bindings.len(),
            scope.sites.len()
        );
        Ok(scope)
    }

    fn reference(&mut self, var: &mut Var, frame: FrameId) -> BindingId {
        let scope = &mut self.scope;
        let binding = match scope.lookup(frame, &var.name) {
            | Some(binding) => binding,
            | None => scope.declare(scope.root, &var.name, Role::Implicit, false),
        };
        let site = scope.sites.alloc(binding);
        scope.bindings[&binding].refs.push(site);
        var.site = Some(site);
        binding
    }
}

pub trait Resolve {
    fn resolve(&mut self, resolver: &mut Resolver, frame: FrameId);
}

impl Resolve for Var {
    fn resolve(&mut self, resolver: &mut Resolver, frame: FrameId) {
        resolver.reference(self, frame);
    }
}

impl Resolve for Term {
    fn resolve(&mut self, resolver: &mut Resolver, frame: FrameId) {
        match self {
            | Term::Lit(_) => {}
            | Term::Var(var) => var.resolve(resolver, frame),
            | Term::Binary(Binary { op: _, lhs, rhs }) => {
                lhs.resolve(resolver, frame);
                rhs.resolve(resolver, frame);
            }
            | Term::Assign(Assign { target, value }) => {
                let binding = resolver.reference(target, frame);
                value.resolve(resolver, frame);
                resolver.scope.bindings[&binding].assigned += 1;
            }
            | Term::Let(Let { binds, body }) => {
                // each binding sees the ones before it
                let mut frame = frame;
                for LetBind { name, init, frame: slot } in binds {
                    if let Some(init) = init {
                        init.resolve(resolver, frame);
                    }
                    frame = resolver.scope.open(frame);
                    resolver.scope.declare(frame, name, Role::Param, false);
                    *slot = Some(frame);
                }
                body.resolve(resolver, frame);
            }
            | Term::Func(Func { name, params, locals, body, unguarded: _, frame: slot }) => {
                let scope = &mut resolver.scope;
                let frame = scope.open(frame);
                *slot = Some(frame);
                if let Some(name) = name {
                    scope.declare(frame, name, Role::SelfName, false);
                }
                for (i, param) in params.iter().enumerate() {
                    scope.declare(frame, param, Role::Param, i == 0);
                }
                for local in locals.iter() {
                    // a local never shadows a parameter of the same frame
                    let declared = scope.frames[&frame]
                        .names
                        .get(local)
                        .is_some_and(|id| scope.bindings[id].role == Role::Param);
                    if !declared {
                        scope.declare(frame, local, Role::Local, false);
                    }
                }
                body.resolve(resolver, frame);
            }
            | Term::If(If { cond, then, alt }) => {
                cond.resolve(resolver, frame);
                then.resolve(resolver, frame);
                if let Some(alt) = alt {
                    alt.resolve(resolver, frame);
                }
            }
            | Term::Seq(Seq(terms)) => {
                for term in terms {
                    term.resolve(resolver, frame);
                }
            }
            | Term::Call(Call { callee, args }) => {
                callee.resolve(resolver, frame);
                for arg in args {
                    arg.resolve(resolver, frame);
                }
            }
        }
    }
}
