use crate::{err::RuntimeError, runtime::Checkpoint};
use derive_more::From;
use lscript_codegen::Style;
use lscript_syntax::{BinOp, VarName};
use std::{
    cell::{Cell, RefCell},
    io::Write,
    rc::Rc,
};

/* ------------------------------- Addressing ------------------------------- */

/// A variable as `depth` frames up from the current one, then `slot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Addr {
    pub depth: usize,
    pub slot: usize,
}

/* ------------------------------- Linked code ------------------------------ */

#[derive(Clone, Debug)]
pub enum Expr {
    Const(Value),
    Load(Addr),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Store { target: Addr, value: Box<Expr> },
    Proc(Rc<Proc>),
    Cond { cond: Box<Expr>, then: Box<Expr>, alt: Box<Expr> },
    Seq(Vec<Expr>),
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

/// Frame layout: the self name when `named`, then the parameters, then
/// the locals.
#[derive(Clone, Debug)]
pub struct Proc {
    pub name: Option<VarName>,
    pub named: bool,
    pub arity: usize,
    pub size: usize,
    /// where the checkpoint hook lives, seen from the defining frame
    pub guard: Option<Addr>,
    pub body: Expr,
}

#[derive(Clone, Debug)]
pub struct Loaded {
    pub style: Style,
    /// the program procedure, taking the three hooks
    pub entry: Rc<Proc>,
    /// the frame enclosing the program: prelude values, then names nothing
    /// declared
    pub host: Vec<(VarName, Value)>,
}

/* --------------------------------- Values --------------------------------- */

#[derive(From, Clone, Debug)]
pub enum Value {
    #[from(ignore)]
    Undefined,
    Num(f64),
    Str(Rc<str>),
    Bool(bool),
    Closure(Rc<Closure>),
    Prim(Builtin),
    Hook(Hook),
}

#[derive(Clone, Debug)]
pub struct Closure {
    pub proc: Rc<Proc>,
    pub env: Env,
}

pub type PrimFn = fn(&[Value], &mut dyn Write) -> Result<Value, RuntimeError>;

#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub prim: PrimFn,
    /// takes a continuation before its arguments
    pub cps: bool,
}

/// The three entry points a program receives from its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    /// the result sink
    Sink,
    /// the checkpoint primitive
    Guard,
    /// the trampoline entry point
    Execute,
}

/// A call that has not happened yet.
#[derive(Clone, Debug)]
pub struct Continuation {
    pub callee: Value,
    pub args: Vec<Value>,
}

/* ------------------------------ Environments ------------------------------ */

#[derive(Clone)]
pub struct Env(pub Rc<Frame>);

pub struct Frame {
    pub slots: RefCell<Vec<Value>>,
    pub parent: Option<Env>,
}

/* --------------------------------- Runtime -------------------------------- */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// iterations of a catch loop
    pub activations: usize,
    /// activations that started from a captured continuation
    pub resumes: usize,
    /// `execute` calls made while a catch loop was already running
    pub nested: usize,
}

/// How one activation ended.
#[derive(Debug)]
pub enum Outcome {
    Completed(Value),
    Suspended(Continuation),
}

pub enum Step<T, Out> {
    Done(Out),
    Step(T),
}

pub struct Runtime<'rt> {
    pub(crate) output: RefCell<&'rt mut dyn Write>,
    pub(crate) budget: usize,
    pub(crate) steps: Cell<isize>,
    /// a catch loop is active
    pub(crate) looping: Cell<bool>,
    pub(crate) checkpoint: Box<dyn Checkpoint + 'rt>,
    pub(crate) stats: Cell<Stats>,
    pub(crate) result: RefCell<Option<Value>>,
}
