use colored::Colorize;
use lscript_driver::{Compiler, Result, Stage};
use std::io::{self, BufRead, Write};

/// Line prefixes that print a stage instead of running the line.
const COMMANDS: [(&str, Stage); 4] =
    [(":ast", Stage::Ast), (":cps", Stage::Cps), (":opt", Stage::Optimized), (":js", Stage::Js)];

pub struct Repl {
    compiler: Compiler,
}

impl Repl {
    pub fn new(compiler: Compiler) -> Self {
        Repl { compiler }
    }

    /// Every line is a program of its own.
    pub fn line(&self, line: &str, out: &mut dyn Write) -> Result<Option<String>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        for (command, stage) in COMMANDS {
            if let Some(source) = line.strip_prefix(command) {
                return Ok(Some(self.compiler.emit(source, stage)?));
            }
        }
        let value = self.compiler.run_to(line, out)?;
        Ok(Some(value.to_string()))
    }

    pub fn launch(&self) -> io::Result<()> {
        println!("lscript v{}", env!("CARGO_PKG_VERSION"));
        let stdin = io::stdin();
        let mut input = stdin.lock();
        loop {
            print!("> ");
            io::stdout().flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                println!();
                return Ok(());
            }
            match self.line(&line, &mut io::stdout()) {
                | Ok(Some(shown)) => println!("{}", shown),
                | Ok(None) => {}
                | Err(err) => eprintln!("{} {}", "error:".red().bold(), err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_run_or_show_a_stage() {
        let repl = Repl::new(Compiler::default());
        let mut out = Vec::new();
        assert_eq!(repl.line("  ", &mut out).unwrap(), None);
        assert_eq!(repl.line("println(1); 1 + 1\n", &mut out).unwrap().as_deref(), Some("2"));
        assert_eq!(String::from_utf8(out).unwrap(), "1\n");
        let mut out = Vec::new();
        let shown = repl.line(":opt 2 + 3 * 4", &mut out).unwrap();
        assert_eq!(shown.as_deref(), Some("$toplevel(14)"));
        assert!(repl.line("1 +", &mut out).is_err());
    }
}
