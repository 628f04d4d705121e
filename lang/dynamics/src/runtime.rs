//! The trampoline: catch loops that resume captured continuations.

use crate::{
    err::{Result, RuntimeError, Unwind},
    syntax::*,
};
use auto_impl::auto_impl;
use std::{
    cell::{Cell, RefCell},
    io::Write,
    rc::Rc,
};

/// Decides, on entry to a guarded procedure, whether to keep going or to
/// capture the call and unwind to the catch loop.
#[auto_impl(&, Box, Rc)]
pub trait Checkpoint {
    fn check(
        &self, runtime: &Runtime<'_>, k: Continuation,
    ) -> std::result::Result<Continuation, Unwind>;
}

/// Unwinds once a fixed number of guarded entries has passed in the
/// current activation.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepBudget;

impl Checkpoint for StepBudget {
    fn check(
        &self, runtime: &Runtime<'_>, k: Continuation,
    ) -> std::result::Result<Continuation, Unwind> {
        if runtime.tick() < 0 { Err(Unwind::Suspend(k)) } else { Ok(k) }
    }
}

impl<'rt> Runtime<'rt> {
    pub const DEFAULT_BUDGET: usize = 200;

    pub fn new(output: &'rt mut dyn Write) -> Self {
        Runtime {
            output: RefCell::new(output),
            budget: Self::DEFAULT_BUDGET,
            steps: Cell::new(Self::DEFAULT_BUDGET as isize),
            looping: Cell::new(false),
            checkpoint: Box::new(StepBudget),
            stats: Cell::new(Stats::default()),
            result: RefCell::new(None),
        }
    }
    /// At least one guarded entry runs per activation, so every resume
    /// makes progress.
    pub fn budget(mut self, budget: usize) -> Self {
        self.budget = budget.max(1);
        self
    }
    pub fn checkpoint(mut self, checkpoint: impl Checkpoint + 'rt) -> Self {
        self.checkpoint = Box::new(checkpoint);
        self
    }

    /// Spends one step of the activation budget and returns what is left.
    pub fn tick(&self) -> isize {
        let left = self.steps.get() - 1;
        self.steps.set(left);
        left
    }
    pub fn stats(&self) -> Stats {
        self.stats.get()
    }
    fn count(&self, f: impl FnOnce(&mut Stats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    /// One iteration of a catch loop: runs `k` until it returns or a
    /// checkpoint captures it.
    pub fn activate(&self, k: Continuation) -> Result<Outcome> {
        self.steps.set(self.budget as isize);
        self.count(|stats| stats.activations += 1);
        let looping = self.looping.replace(true);
        let res = self.apply(k.callee, k.args);
        self.looping.set(looping);
        match res {
            | Ok(value) => Ok(Outcome::Completed(value)),
            | Err(Unwind::Suspend(k)) => Ok(Outcome::Suspended(k)),
            | Err(Unwind::Fault(err)) => Err(err),
        }
    }

    /// Activates `k` and every continuation captured from it, until one
    /// completes.
    pub fn trampoline(&self, mut k: Continuation) -> Result<Value> {
        loop {
            match self.activate(k)? {
                | Outcome::Completed(value) => return Ok(value),
                | Outcome::Suspended(next) => {
                    self.count(|stats| stats.resumes += 1);
                    log::trace!("resuming {} after a checkpoint", next.callee);
                    k = next;
                }
            }
        }
    }

    /// Runs `entry` under a catch loop, unless one is already running, in
    /// which case the call is made in place and suspensions propagate to
    /// the running loop.
    pub fn execute(&self, entry: Value, args: Vec<Value>) -> std::result::Result<Value, Unwind> {
        if self.looping.get() {
            self.count(|stats| stats.nested += 1);
            return self.apply(entry, args);
        }
        self.trampoline(Continuation { callee: entry, args }).map_err(Unwind::from)
    }

    /// Runs a linked program, returning the value it hands to its sink.
    pub fn run(&self, loaded: &Loaded) -> Result<Value> {
        self.result.replace(None);
        let host = loaded.host.iter().map(|(_, value)| value.clone()).collect();
        let closure = Closure { proc: loaded.entry.clone(), env: Env::new(host, None) };
        let args = [Hook::Sink, Hook::Guard, Hook::Execute].map(Value::Hook).to_vec();
        self.trampoline(Continuation { callee: Value::Closure(Rc::new(closure)), args })?;
        let stats = self.stats();
        log::debug!(
            "{:?} program done: {} activations, {} resumes, {} nested",
            loaded.style,
            stats.activations,
            stats.resumes,
            stats.nested
        );
        self.result.take().ok_or(RuntimeError::NoResult)
    }
}
