use crate::{
    err::{RuntimeError, Unwind},
    syntax::*,
};
use lscript_syntax::BinOp;
use std::rc::Rc;

pub trait Eval<'rt> {
    /// Evaluates in tail position: a call is handed back instead of made.
    fn step(
        &self, runtime: &Runtime<'rt>, env: &Env,
    ) -> Result<Step<Continuation, Value>, Unwind>;
    fn eval(&self, runtime: &Runtime<'rt>, env: &Env) -> Result<Value, Unwind> {
        match self.step(runtime, env)? {
            | Step::Done(value) => Ok(value),
            | Step::Step(k) => runtime.apply(k.callee, k.args),
        }
    }
}

impl<'rt> Eval<'rt> for Expr {
    fn step(
        &self, runtime: &Runtime<'rt>, env: &Env,
    ) -> Result<Step<Continuation, Value>, Unwind> {
        let value = match self {
            | Expr::Const(value) => value.clone(),
            | Expr::Load(addr) => env.load(*addr),
            | Expr::Binary { op: BinOp::And, lhs, rhs } => {
                let lhs = lhs.eval(runtime, env)?;
                if lhs.is_false() { lhs } else { rhs.eval(runtime, env)? }
            }
            | Expr::Binary { op: BinOp::Or, lhs, rhs } => {
                let lhs = lhs.eval(runtime, env)?;
                if lhs.is_false() { rhs.eval(runtime, env)? } else { lhs }
            }
            | Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval(runtime, env)?;
                let rhs = rhs.eval(runtime, env)?;
                binary(*op, lhs, rhs)?
            }
            | Expr::Store { target, value } => {
                let value = value.eval(runtime, env)?;
                env.store(*target, value.clone());
                value
            }
            | Expr::Proc(proc) => {
                Value::Closure(Rc::new(Closure { proc: proc.clone(), env: env.clone() }))
            }
            | Expr::Cond { cond, then, alt } => {
                let cond = cond.eval(runtime, env)?;
                let branch = if cond.is_false() { alt } else { then };
                return branch.step(runtime, env);
            }
            | Expr::Seq(exprs) => {
                let Some((last, init)) = exprs.split_last() else {
                    return Ok(Step::Done(Value::Bool(false)));
                };
                for expr in init {
                    expr.eval(runtime, env)?;
                }
                return last.step(runtime, env);
            }
            | Expr::Call { callee, args } => {
                let callee = callee.eval(runtime, env)?;
                let args =
                    args.iter().map(|arg| arg.eval(runtime, env)).collect::<Result<_, _>>()?;
                return Ok(Step::Step(Continuation { callee, args }));
            }
        };
        Ok(Step::Done(value))
    }
}

/// Strict binary operators on runtime values.
pub fn binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    if let (Some(l), Some(r)) = (lhs.to_literal(), rhs.to_literal()) {
        return Ok(op.fold(&l, &r)?.into());
    }
    match op {
        | BinOp::Eq => Ok(Value::Bool(lhs.same(&rhs))),
        | BinOp::Ne => Ok(Value::Bool(!lhs.same(&rhs))),
        | BinOp::Add if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) => {
            Ok(Value::Str(format!("{}{}", lhs, rhs).into()))
        }
        | BinOp::And => Ok(if lhs.is_false() { lhs } else { rhs }),
        | BinOp::Or => Ok(if lhs.is_false() { rhs } else { lhs }),
        | op => Err(RuntimeError::Type { op, lhs: lhs.kind(), rhs: rhs.kind() }),
    }
}

impl<'rt> Runtime<'rt> {
    /// Calls `callee`, running tail calls in a loop on the same Rust frame.
    pub fn apply(&self, callee: Value, args: Vec<Value>) -> Result<Value, Unwind> {
        let mut k = Continuation { callee, args };
        loop {
            k = match self.enter(k)? {
                | Step::Done(value) => return Ok(value),
                | Step::Step(next) => next,
            };
        }
    }

    fn enter(&self, k: Continuation) -> Result<Step<Continuation, Value>, Unwind> {
        let Continuation { callee, args } = k;
        match callee {
            | Value::Closure(closure) => {
                // the checkpoint sees the call before any frame exists
                let args = match closure.proc.guard {
                    | Some(addr) => {
                        let guard = closure.env.load(addr);
                        let k = Continuation { callee: Value::Closure(closure.clone()), args };
                        self.guard(guard, k)?.args
                    }
                    | None => args,
                };
                let env = Closure::bind(&closure, args);
                closure.proc.body.step(self, &env)
            }
            | Value::Prim(builtin) if builtin.cps => match args.split_first() {
                | Some((k, args)) => {
                    let value = self.prim(builtin, args)?;
                    Ok(Step::Step(Continuation { callee: k.clone(), args: vec![value] }))
                }
                | None => Ok(Step::Done(self.prim(builtin, &[])?)),
            },
            | Value::Prim(builtin) => Ok(Step::Done(self.prim(builtin, &args)?)),
            | Value::Hook(hook) => Ok(Step::Done(self.hook(hook, args)?)),
            | callee => Err(RuntimeError::NotCallable(callee.to_string()).into()),
        }
    }

    fn guard(&self, guard: Value, k: Continuation) -> Result<Continuation, Unwind> {
        match guard {
            | Value::Hook(Hook::Guard) => self.checkpoint.check(self, k),
            | _ => Ok(k),
        }
    }

    fn prim(&self, builtin: Builtin, args: &[Value]) -> Result<Value, RuntimeError> {
        let mut output = self.output.borrow_mut();
        (builtin.prim)(args, &mut **output)
    }

    fn hook(&self, hook: Hook, args: Vec<Value>) -> Result<Value, Unwind> {
        let mut args = args.into_iter();
        match hook {
            | Hook::Sink => {
                let value = args.next().unwrap_or(Value::Undefined);
                log::debug!("program result: {}", value);
                self.result.replace(Some(value));
                Ok(Value::Undefined)
            }
            // only reachable by calling the hook by hand
            | Hook::Guard => Ok(Value::Undefined),
            | Hook::Execute => {
                let entry = args.next().unwrap_or(Value::Undefined);
                self.execute(entry, args.collect())
            }
        }
    }
}
