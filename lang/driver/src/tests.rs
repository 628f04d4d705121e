use crate::*;
use lscript_cps::OptimizeError;
use lscript_dynamics::{Checkpoint, Continuation, Runtime, Stats, Unwind, Value, builtin};
use lscript_statics::ResolveError;
use pretty_assertions::assert_eq;
use std::cell::Cell;

const SUM: &str = "sum = func(n) if n == 0 then 0 else n + sum(n - 1); sum(10)";
const LOOP: &str = "let loop(i = 1, acc = 0) if i > 1000000 then acc else loop(i + 1, acc + i)";

fn num(value: Result<Value>) -> f64 {
    match value {
        | Ok(Value::Num(n)) => n,
        | Ok(value) => panic!("expected a number, got {}", value),
        | Err(err) => panic!("{}", err),
    }
}

fn unoptimized() -> Compiler {
    Compiler::new(Conf { optimize: false, ..Conf::default() })
}

#[test]
fn cps_agrees_with_direct_style() {
    let mut out = Vec::new();
    let compiler = unoptimized();
    assert_eq!(num(compiler.run_direct_to("1 + 2 * 3", &mut out)), 7.0);
    assert_eq!(num(compiler.run_to("1 + 2 * 3", &mut out)), 7.0);
    assert_eq!(num(compiler.run_to(SUM, &mut out)), 55.0);
    assert_eq!(num(compiler.run_direct_to(SUM, &mut out)), 55.0);
    assert_eq!(num(Compiler::default().run_to(SUM, &mut out)), 55.0);
}

#[test]
fn constants_fold_before_emission() {
    let compiler = Compiler::default();
    assert_eq!(compiler.emit("2 + 3 * 4", Stage::Optimized).unwrap(), "$toplevel(14)");
    let js = compiler.emit("2 + 3 * 4", Stage::Js).unwrap();
    assert!(js.contains("$toplevel(14);"), "{}", js);
    assert_eq!(compiler.emit("2 + 3 * 4", Stage::Ast).unwrap(), "{(2 + (3 * 4))}");
}

#[test]
fn division_by_zero_stops_compilation() {
    let err = Compiler::default().compile("x = 1; 1 / 0").unwrap_err();
    assert!(matches!(
        err,
        BuildError::OptimizeError(OptimizeError::DivisionByZero { ref expr }) if expr == "(1 / 0)"
    ));
    let mut out = Vec::new();
    let err = Compiler::default().run_direct_to("1 / 0", &mut out).unwrap_err();
    assert_eq!(err.to_string(), "division by zero");
}

#[test]
fn tail_recursion_runs_under_the_trampoline() {
    let mut out = Vec::new();
    assert_eq!(num(Compiler::default().run_to(LOOP, &mut out)), 500000500000.0);
    assert_eq!(num(unoptimized().run_to(LOOP, &mut out)), 500000500000.0);
}

#[test]
fn deep_recursion_resumes_from_checkpoints() {
    let compiler = Compiler::new(Conf { budget: 50, ..Conf::default() });
    let source = "sum = func(n) if n == 0 then 0 else n + sum(n - 1); sum(20000)";
    let loaded = compiler.load(source).unwrap();
    let mut out = Vec::new();
    let runtime = compiler.runtime(&mut out);
    let value = runtime.run(&loaded);
    assert!(matches!(value, Ok(Value::Num(n)) if n == 200010000.0));
    assert!(runtime.stats().resumes > 100);
}

/// Runs `source` optimized, unoptimized and in direct style.
fn agree(source: &str) -> f64 {
    let mut out = Vec::new();
    let optimized = num(Compiler::default().run_to(source, &mut out));
    assert_eq!(num(unoptimized().run_to(source, &mut out)), optimized);
    assert_eq!(num(Compiler::default().run_direct_to(source, &mut out)), optimized);
    optimized
}

#[test]
fn inlined_lets_do_not_collide_in_one_function() {
    let source = "f = func(a) { \
                    p = let (x = a + 1) x * 2; \
                    q = let (x = a * 10) x + p; \
                    p + q \
                  }; \
                  f(2)";
    assert_eq!(agree(source), 32.0);
    let opt = Compiler::default().emit(source, Stage::Optimized).unwrap();
    assert!(opt.contains("x$"), "{}", opt);
}

#[test]
fn inlined_lets_do_not_capture_outer_names() {
    // `y` in `+ y` belongs to `g`, not to the inlined `let`
    let source = "g = func(y) { \
                    h = func(z) (let (y = z * 2) y) + y; \
                    h(5) \
                  }; \
                  g(1)";
    assert_eq!(agree(source), 11.0);
    let opt = Compiler::default().emit(source, Stage::Optimized).unwrap();
    assert!(opt.contains("y$"), "{}", opt);
}

#[test]
fn zero_budget_in_code_still_completes() {
    let compiler = Compiler::new(Conf { budget: 0, ..Conf::default() });
    let mut out = Vec::new();
    assert_eq!(num(compiler.run_to(SUM, &mut out)), 55.0);
}

#[test]
fn prelude_output_is_captured() {
    let mut out = Vec::new();
    let value = Compiler::default().run_to("println(\"sum\", 1 + 2); print(\"x\"); 5", &mut out);
    assert_eq!(num(value), 5.0);
    assert_eq!(String::from_utf8(out).unwrap(), "sum 3\nx");
}

#[test]
fn strict_mode_rejects_unassigned_globals() {
    let compiler = Compiler::new(Conf { strict: true, ..Conf::default() });
    let err = compiler.compile("y = 1; x + y").unwrap_err();
    assert!(matches!(
        err,
        BuildError::ResolveError(ResolveError::Unbound(ref name)) if name.plain() == "x"
    ));
    let mut out = Vec::new();
    assert_eq!(num(compiler.run_to("x = 2; println(x); x", &mut out)), 2.0);
    // permissive mode reads it as undefined
    let value = Compiler::default().run_to("x", &mut out).unwrap();
    assert_eq!(value.kind(), "undefined");
}

/// Calls back into the runtime the first time a guarded procedure is entered.
struct Reenter(Cell<bool>);

impl Checkpoint for Reenter {
    fn check(
        &self, runtime: &Runtime<'_>, k: Continuation,
    ) -> std::result::Result<Continuation, Unwind> {
        if !self.0.replace(true) {
            if let Some(println) = builtin::direct("println") {
                runtime.execute(println, vec!["checkpoint".into()])?;
            }
        }
        Ok(k)
    }
}

#[test]
fn nested_execute_reuses_the_running_loop() {
    let compiler = Compiler::default();
    let loaded = compiler.load(SUM).unwrap();
    let mut out = Vec::new();
    {
        let runtime = compiler.runtime(&mut out).checkpoint(Reenter(Cell::new(false)));
        let value = runtime.run(&loaded);
        assert!(matches!(value, Ok(Value::Num(n)) if n == 55.0));
        assert_eq!(runtime.stats(), Stats { activations: 1, resumes: 0, nested: 1 });
    }
    assert_eq!(String::from_utf8(out).unwrap(), "checkpoint\n");
}

#[test]
fn calling_a_number_is_a_runtime_error() {
    let mut out = Vec::new();
    let err = Compiler::default().run_to("f = 3; f(1)", &mut out).unwrap_err();
    assert_eq!(err.to_string(), "`3` is not a function");
}
