//! Syntax tree shared by every stage of the pipeline.
//!
//! The same [`Term`] type carries both the direct-style program produced by
//! the parser and the continuation-passing program produced by the CPS
//! transformer. The `site` and `frame` slots are annotations written by the
//! scope resolver and are `None` on freshly built nodes.

pub mod fmt;
pub use fmt::*;

pub mod ops;
pub use ops::*;

mod impls;
pub use impls::{quote_str, show_num};

use derive_more::From;
use lscript_utils::arena::new_key_type;

new_key_type! {
    /// A variable occurrence, numbered by the resolver in walk order.
    pub struct SiteId;
    /// A lexical frame opened by a function or a let binding.
    pub struct FrameId;
    /// A declared name.
    pub struct BindingId;
}

/// Names the generated program receives from, or reserves against, its host.
/// All of them contain `$`, which no source identifier can.
pub mod hook {
    /// the result sink the top-level continuation calls
    pub const TOPLEVEL: &str = "$toplevel";
    /// the checkpoint primitive of guarded procedures
    pub const GUARD: &str = "$guard";
    /// the trampoline entry point
    pub const EXECUTE: &str = "$execute";
    /// scratch variable used by the rendering of `||`
    pub const TMP: &str = "$tmp";
    /// self name given to guarded anonymous procedures
    pub const SELF: &str = "$cc";

    pub const ALL: [&str; 5] = [TOPLEVEL, GUARD, EXECUTE, TMP, SELF];
}

/* --------------------------------- Binder --------------------------------- */

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarName(pub String);

/* -------------------------------- Literals -------------------------------- */

#[derive(From, Clone, Debug, PartialEq)]
pub enum Literal {
    Num(f64),
    Str(String),
    Bool(bool),
}

/* ---------------------------------- Terms --------------------------------- */

/// `x`
#[derive(Clone, Debug, PartialEq)]
pub struct Var {
    pub name: VarName,
    pub site: Option<SiteId>,
}

/// `a op b`
#[derive(Clone, Debug, PartialEq)]
pub struct Binary {
    pub op: BinOp,
    pub lhs: Box<Term>,
    pub rhs: Box<Term>,
}

/// `x = a`
#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    pub target: Var,
    pub value: Box<Term>,
}

/// `let (x = a, y) body`
#[derive(Clone, Debug, PartialEq)]
pub struct Let {
    pub binds: Vec<LetBind>,
    pub body: Box<Term>,
}
#[derive(Clone, Debug, PartialEq)]
pub struct LetBind {
    pub name: VarName,
    pub init: Option<Box<Term>>,
    pub frame: Option<FrameId>,
}

/// `func name(params) body`
#[derive(Clone, Debug, PartialEq)]
pub struct Func {
    pub name: Option<VarName>,
    pub params: Vec<VarName>,
    /// names declared in the body's frame without being parameters
    pub locals: Vec<VarName>,
    pub body: Box<Term>,
    /// no stack-guard checkpoint is emitted for this function
    pub unguarded: bool,
    pub frame: Option<FrameId>,
}

/// `if cond then a else b`
#[derive(Clone, Debug, PartialEq)]
pub struct If {
    pub cond: Box<Term>,
    pub then: Box<Term>,
    pub alt: Option<Box<Term>>,
}

/// `{ a; b; c }`
#[derive(Clone, Debug, PartialEq)]
pub struct Seq(pub Vec<Term>);

/// `f(a, b)`
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub callee: Box<Term>,
    pub args: Vec<Term>,
}

#[derive(From, Clone, Debug, PartialEq)]
pub enum Term {
    Lit(Literal),
    Var(Var),
    Binary(Binary),
    Assign(Assign),
    Let(Let),
    Func(Func),
    If(If),
    Seq(Seq),
    Call(Call),
}
