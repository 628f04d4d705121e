//! The host prelude.

use crate::{err::Result, syntax::*};
use lscript_codegen::Style;
use lscript_syntax::VarName;
use once_cell::sync::Lazy;
use std::{collections::BTreeMap, io::Write};

fn show(args: &[Value]) -> String {
    args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>().join(" ")
}

pub fn print(args: &[Value], out: &mut dyn Write) -> Result<Value> {
    write!(out, "{}", show(args))?;
    out.flush()?;
    Ok(Value::Bool(false))
}

pub fn println(args: &[Value], out: &mut dyn Write) -> Result<Value> {
    writeln!(out, "{}", show(args))?;
    Ok(Value::Bool(false))
}

pub static BUILTINS: Lazy<BTreeMap<&'static str, PrimFn>> = Lazy::new(|| {
    let mut builtins: BTreeMap<&'static str, PrimFn> = BTreeMap::new();
    builtins.insert("print", print);
    builtins.insert("println", println);
    builtins
});

/// Host names, for the resolver and the emitter.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.keys().copied()
}

/// The builtins under the calling convention of `style`.
pub fn prelude(style: Style) -> Vec<(VarName, Value)> {
    BUILTINS
        .iter()
        .map(|(&name, &prim)| {
            let builtin = Builtin { name, prim, cps: style == Style::Cps };
            (VarName::from(name), Value::Prim(builtin))
        })
        .collect()
}

/// A single builtin called directly, as a host would.
pub fn direct(name: &str) -> Option<Value> {
    let (&name, &prim) = BUILTINS.get_key_value(name)?;
    Some(Value::Prim(Builtin { name, prim, cps: false }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn printing_joins_display_forms() {
        let mut out = Vec::new();
        let args = [Value::from("sum"), Value::Num(55.0), Value::Bool(true)];
        let ret = println(&args, &mut out).unwrap();
        print(&[Value::Num(1.5)], &mut out).unwrap();
        assert!(ret.is_false());
        assert_eq!(String::from_utf8(out).unwrap(), "sum 55 true\n1.5");
    }

    #[test]
    fn prelude_follows_the_calling_convention() {
        assert_eq!(names().collect::<Vec<_>>(), vec!["print", "println"]);
        let cps = prelude(Style::Cps);
        assert!(cps.iter().all(|(_, v)| matches!(v, Value::Prim(b) if b.cps)));
        assert!(matches!(direct("println"), Some(Value::Prim(b)) if !b.cps));
        assert!(direct("exit").is_none());
    }
}
