//! The backend language: an expression-only subset of JavaScript.

use lscript_syntax::{BinOp, Literal, VarName, hook};
use std::fmt;

/// Calling convention of a generated program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Style {
    /// every function takes its continuation first and guarded
    /// procedures check the stack budget
    #[default]
    Cps,
    /// ordinary calls and returns, no checkpoints
    Direct,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub style: Style,
    /// hooks, in the order the host passes them
    pub params: Vec<VarName>,
    /// implicit globals declared by the program itself
    pub globals: Vec<VarName>,
    pub body: Js,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Proc {
    pub name: Option<VarName>,
    pub params: Vec<VarName>,
    pub locals: Vec<VarName>,
    /// checks the stack budget on entry
    pub guard: bool,
    pub body: Box<Js>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Js {
    Lit(Literal),
    Var(VarName),
    Binary { op: BinOp, lhs: Box<Js>, rhs: Box<Js> },
    Assign { target: VarName, value: Box<Js> },
    Proc(Proc),
    Cond { cond: Box<Js>, then: Box<Js>, alt: Box<Js> },
    Seq(Vec<Js>),
    Call { callee: Box<Js>, args: Vec<Js> },
}

/* -------------------------------- Mangling -------------------------------- */

const RESERVED: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// A valid JavaScript identifier for `name`.
///
/// `$` passes through untouched since only generated names carry it. Any
/// other character outside `[A-Za-z0-9_]` becomes `$x` and its hex code,
/// which no generated `name$n` can spell.
pub fn mangle(name: &VarName) -> String {
    let plain = name.plain();
    if RESERVED.contains(&plain) {
        return format!("{}$", plain);
    }
    let mut out = String::with_capacity(plain.len());
    for c in plain.chars() {
        match c {
            | 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$' => out.push(c),
            | c => out.push_str(&format!("$x{:02x}", c as u32)),
        }
    }
    out
}

struct Names<'a>(&'a [VarName]);

impl fmt::Display for Names<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self.0.iter().map(mangle).collect::<Vec<_>>();
        write!(f, "{}", names.join(", "))
    }
}

/* -------------------------------- Rendering ------------------------------- */

impl fmt::Display for Js {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            | Js::Lit(lit) => write!(f, "{}", lit),
            | Js::Var(name) => write!(f, "{}", mangle(name)),
            | Js::Binary { op: BinOp::And, lhs, rhs } => {
                write!(f, "({} !== false ? {} : false)", lhs, rhs)
            }
            | Js::Binary { op: BinOp::Or, lhs, rhs } => {
                write!(f, "(({} = {}) !== false ? {} : {})", hook::TMP, lhs, hook::TMP, rhs)
            }
            | Js::Binary { op, lhs, rhs } => {
                let op = match op {
                    | BinOp::Eq => "===",
                    | BinOp::Ne => "!==",
                    | op => op.symbol(),
                };
                write!(f, "({} {} {})", lhs, op, rhs)
            }
            | Js::Assign { target, value } => write!(f, "({} = {})", mangle(target), value),
            | Js::Proc(proc) => write!(f, "{}", proc),
            | Js::Cond { cond, then, alt } => {
                write!(f, "({} !== false ? {} : {})", cond, then, alt)
            }
            | Js::Seq(terms) => {
                let terms = terms.iter().map(|t| t.to_string()).collect::<Vec<_>>();
                write!(f, "({})", terms.join(", "))
            }
            | Js::Call { callee, args } => {
                let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
                match callee.as_ref() {
                    | Js::Proc(_) => write!(f, "({})({})", callee, args.join(", ")),
                    | _ => write!(f, "{}({})", callee, args.join(", ")),
                }
            }
        }
    }
}

impl fmt::Display for Proc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Proc { name, params, locals, guard, body } = self;
        write!(f, "function")?;
        if let Some(name) = name {
            write!(f, " {}", mangle(name))?;
        }
        write!(f, "({}) {{ ", Names(params))?;
        if !locals.is_empty() {
            write!(f, "var {}; ", Names(locals))?;
        }
        if *guard {
            let name = name.as_ref().map(mangle).unwrap_or_else(|| hook::SELF.to_string());
            write!(f, "{}(arguments, {}); ", hook::GUARD, name)?;
        }
        write!(f, "return {}; }}", body)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Program { style: _, params, globals, body } = self;
        writeln!(f, "(function ({}) {{", Names(params))?;
        writeln!(f, "  \"use strict\";")?;
        write!(f, "  var {}", hook::TMP)?;
        for global in globals {
            write!(f, ", {}", mangle(global))?;
        }
        writeln!(f, ";")?;
        writeln!(f, "  {};", body)?;
        write!(f, "}})")
    }
}
