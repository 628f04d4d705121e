use crate::syntax::*;
use lscript_syntax::{Literal, show_num};
use std::{cell::RefCell, fmt, rc::Rc};

/* --------------------------------- Values --------------------------------- */

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        match lit {
            | Literal::Num(n) => Value::Num(n),
            | Literal::Str(s) => Value::Str(s.into()),
            | Literal::Bool(b) => Value::Bool(b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl Value {
    pub fn to_literal(&self) -> Option<Literal> {
        match self {
            | Value::Num(n) => Some(Literal::Num(*n)),
            | Value::Str(s) => Some(Literal::Str(s.to_string())),
            | Value::Bool(b) => Some(Literal::Bool(*b)),
            | Value::Undefined | Value::Closure(_) | Value::Prim(_) | Value::Hook(_) => None,
        }
    }
    pub fn kind(&self) -> &'static str {
        match self {
            | Value::Undefined => "undefined",
            | Value::Num(_) => "number",
            | Value::Str(_) => "string",
            | Value::Bool(_) => "boolean",
            | Value::Closure(_) | Value::Prim(_) | Value::Hook(_) => "function",
        }
    }
    /// Only `false` is falsy.
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Bool(false))
    }
    /// Equality of values that are not literals: identity for functions.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            | (Value::Undefined, Value::Undefined) => true,
            | (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            | (Value::Prim(a), Value::Prim(b)) => a.name == b.name && a.cps == b.cps,
            | (Value::Hook(a), Value::Hook(b)) => a == b,
            | (a, b) => match (a.to_literal(), b.to_literal()) {
                | (Some(a), Some(b)) => a == b,
                | _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            | Value::Undefined => write!(f, "undefined"),
            | Value::Num(n) => write!(f, "{}", show_num(*n)),
            | Value::Str(s) => write!(f, "{}", s),
            | Value::Bool(b) => write!(f, "{}", b),
            | Value::Closure(closure) => match &closure.proc.name {
                | Some(name) => write!(f, "<function {}>", name),
                | None => write!(f, "<function>"),
            },
            | Value::Prim(builtin) => write!(f, "<builtin {}>", builtin.name),
            | Value::Hook(hook) => write!(f, "<hook {:?}>", hook),
        }
    }
}

/* ------------------------------ Environments ------------------------------ */

/// Frames can be cyclic through closures, so only the slot count is shown.
impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Env({} slots)", self.0.slots.borrow().len())
    }
}

impl Env {
    pub fn new(slots: Vec<Value>, parent: Option<Env>) -> Self {
        Env(Rc::new(Frame { slots: RefCell::new(slots), parent }))
    }
    fn ancestor(&self, depth: usize) -> Option<&Frame> {
        let mut frame: &Frame = &self.0;
        for _ in 0..depth {
            frame = &frame.parent.as_ref()?.0;
        }
        Some(frame)
    }
    /// Reading a slot the linker never laid out gives `undefined`.
    pub fn load(&self, addr: Addr) -> Value {
        self.ancestor(addr.depth)
            .and_then(|frame| frame.slots.borrow().get(addr.slot).cloned())
            .unwrap_or(Value::Undefined)
    }
    pub fn store(&self, addr: Addr, value: Value) {
        if let Some(frame) = self.ancestor(addr.depth) {
            if let Some(slot) = frame.slots.borrow_mut().get_mut(addr.slot) {
                *slot = value;
            }
        }
    }
}

impl Closure {
    /// A fresh frame for one application of `closure`.
    pub fn bind(closure: &Rc<Closure>, args: Vec<Value>) -> Env {
        let Proc { named, arity, size, .. } = *closure.proc;
        let mut slots = vec![Value::Undefined; size];
        let mut first = 0;
        if named {
            if let Some(slot) = slots.first_mut() {
                *slot = Value::Closure(closure.clone());
            }
            first = 1;
        }
        // missing arguments stay undefined, extra ones are dropped
        for (slot, arg) in slots.iter_mut().skip(first).take(arity).zip(args) {
            *slot = arg;
        }
        Env::new(slots, Some(closure.env.clone()))
    }
}

/// Continuation chains can nest frames arbitrarily deep, so frames are torn
/// down with a worklist instead of recursive drops.
impl Drop for Frame {
    fn drop(&mut self) {
        let mut work = Vec::new();
        release(std::mem::take(self.slots.get_mut()), self.parent.take(), &mut work);
        while let Some(frame) = work.pop() {
            if let Ok(mut frame) = Rc::try_unwrap(frame) {
                let slots = std::mem::take(frame.slots.get_mut());
                let parent = frame.parent.take();
                release(slots, parent, &mut work);
            }
        }
    }
}

fn release(slots: Vec<Value>, parent: Option<Env>, work: &mut Vec<Rc<Frame>>) {
    for value in slots {
        if let Value::Closure(closure) = value {
            if let Ok(Closure { proc: _, env }) = Rc::try_unwrap(closure) {
                work.push(env.0);
            }
        }
    }
    if let Some(Env(parent)) = parent {
        work.push(parent);
    }
}
