pub mod cli;
pub use cli::*;
pub mod repl;
pub use repl::Repl;

use lscript_driver::{Conf, Result, Stage};

impl ConfArgs {
    /// The configuration file, if any, with the command-line flags on top.
    pub fn conf(&self) -> Result<Conf> {
        let mut conf = match &self.config {
            | Some(path) => Conf::load(path)?,
            | None => Conf::default(),
        };
        if let Some(budget) = self.budget {
            conf.budget = budget as usize;
        }
        conf.strict |= self.strict;
        conf.optimize &= !self.no_opt;
        conf.check()?;
        Ok(conf)
    }
}

impl From<StageArg> for Stage {
    fn from(stage: StageArg) -> Self {
        match stage {
            | StageArg::Ast => Stage::Ast,
            | StageArg::Cps => Stage::Cps,
            | StageArg::Opt => Stage::Optimized,
            | StageArg::Js => Stage::Js,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_the_defaults() {
        let args = ConfArgs { budget: Some(10), no_opt: true, ..ConfArgs::default() };
        assert_eq!(args.conf().unwrap(), Conf { budget: 10, strict: false, optimize: false });
        assert_eq!(ConfArgs::default().conf().unwrap(), Conf::default());
    }

    #[test]
    fn budget_flag_must_be_positive() {
        use clap::Parser;
        assert!(Cli::try_parse_from(["lscript", "run", "a.ls", "--budget", "0"]).is_err());
        let cli = Cli::try_parse_from(["lscript", "run", "a.ls", "--budget", "3"]).unwrap();
        let Commands::Run { conf, .. } = cli.command else { panic!("expected `run`") };
        assert_eq!(conf.conf().unwrap().budget, 3);
    }
}
