use crate::{conf::Conf, err::Result};
use derive_more::Display;
use lscript_codegen::{Emitter, Program, Style};
use lscript_cps::{Optimized, Optimizer, Transformer};
use lscript_dynamics::{Loaded, Runtime, Value, builtin, link};
use lscript_statics::{Mode, Resolver, Scope};
use lscript_syntax::*;
use lscript_utils::gensym::Gensym;
use std::io::Write;

/// Where `emit` stops.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Stage {
    #[display("ast")]
    Ast,
    #[display("cps")]
    Cps,
    #[display("opt")]
    Optimized,
    #[display("js")]
    Js,
}

/// Every intermediate form of one compilation.
#[derive(Clone, Debug)]
pub struct Compiled {
    pub direct: Term,
    pub cps: Term,
    /// absent when the optimizer is turned off
    pub optimized: Option<Optimized>,
    /// resolution of the term the program was emitted from
    pub scope: Scope,
    pub program: Program,
}

impl Compiled {
    /// The term `program` was emitted from.
    pub fn last(&self) -> &Term {
        match &self.optimized {
            | Some(optimized) => &optimized.term,
            | None => &self.cps,
        }
    }
}

pub struct Compiler {
    pub conf: Conf,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(Conf::default())
    }
}

impl Compiler {
    pub fn new(conf: Conf) -> Self {
        Compiler { conf }
    }

    pub fn parse(&self, source: &str) -> Result<Term> {
        let term = lscript_surface::parse(source)?;
        log::info!("parsed {} bytes", source.len());
        Ok(term)
    }

    /// Parses and resolves a direct-style program, checking its globals in
    /// strict mode.
    fn check(&self, source: &str) -> Result<(Term, Scope)> {
        let mut term = self.parse(source)?;
        let mode = if self.conf.strict { Mode::Strict } else { Mode::Permissive };
        let scope = Resolver::new(mode).host(builtin::names()).run(&mut term)?;
        log::info!("resolved direct-style program ({:?} mode)", mode);
        Ok((term, scope))
    }

    pub fn compile(&self, source: &str) -> Result<Compiled> {
        let (direct, _) = self.check(source)?;
        // one name supply per unit, shared by the transformer and the optimizer
        let mut sym = Gensym::new();
        let mut cps = Transformer::new(&mut sym).toplevel(direct.clone());
        let scope = Resolver::default().run(&mut cps)?;
        log::info!("converted to continuation-passing style");
        let (optimized, scope) = if self.conf.optimize {
            let optimized = Optimizer::new(&mut sym).run(cps.clone())?;
            log::info!(
                "optimized in {} passes with {} rewrites",
                optimized.passes,
                optimized.rewrites
            );
            let scope = optimized.scope.clone();
            (Some(optimized), scope)
        } else {
            (None, scope)
        };
        let term = match &optimized {
            | Some(optimized) => &optimized.term,
            | None => &cps,
        };
        let program = Emitter::new(Style::Cps).host(builtin::names()).emit(term, &scope);
        log::info!("emitted program with {} declared globals", program.globals.len());
        Ok(Compiled { direct, cps, optimized, scope, program })
    }

    /// Compiles and links a program against the CPS prelude.
    pub fn load(&self, source: &str) -> Result<Loaded> {
        let compiled = self.compile(source)?;
        Ok(link(&compiled.program, builtin::prelude(Style::Cps)))
    }

    /// Links the direct-style program, with no continuations and no
    /// checkpoints.
    pub fn load_direct(&self, source: &str) -> Result<Loaded> {
        let (direct, scope) = self.check(source)?;
        let program = Emitter::new(Style::Direct).host(builtin::names()).emit(&direct, &scope);
        Ok(link(&program, builtin::prelude(Style::Direct)))
    }

    /// A runtime configured from `conf`, writing prelude output to `out`.
    pub fn runtime<'rt>(&self, out: &'rt mut dyn Write) -> Runtime<'rt> {
        Runtime::new(out).budget(self.conf.budget)
    }

    pub fn run(&self, source: &str) -> Result<Value> {
        let mut stdout = std::io::stdout().lock();
        self.run_to(source, &mut stdout)
    }

    pub fn run_to(&self, source: &str, out: &mut dyn Write) -> Result<Value> {
        let loaded = self.load(source)?;
        let runtime = self.runtime(out);
        let value = runtime.run(&loaded)?;
        log::info!("program finished after {} activations", runtime.stats().activations);
        Ok(value)
    }

    /// The reference evaluator: the same program in direct style.
    pub fn run_direct(&self, source: &str) -> Result<Value> {
        let mut stdout = std::io::stdout().lock();
        self.run_direct_to(source, &mut stdout)
    }

    pub fn run_direct_to(&self, source: &str, out: &mut dyn Write) -> Result<Value> {
        let loaded = self.load_direct(source)?;
        Ok(self.runtime(out).run(&loaded)?)
    }

    /// Renders the program as it stands after `stage`.
    pub fn emit(&self, source: &str, stage: Stage) -> Result<String> {
        let fmt = Formatter::new();
        let out = match stage {
            | Stage::Ast => self.parse(source)?.ugly(&fmt),
            | Stage::Cps => self.compile(source)?.cps.ugly(&fmt),
            | Stage::Optimized => self.compile(source)?.last().ugly(&fmt),
            | Stage::Js => self.compile(source)?.program.to_string(),
        };
        log::info!("emitted stage `{}`", stage);
        Ok(out)
    }
}
