use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lscript", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an lscript program and print its result
    Run {
        /// Path to the file to run
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        conf: ConfArgs,
        /// Run the direct-style program, without continuations or checkpoints
        #[arg(long, default_value_t = false)]
        direct: bool,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Print a program as it stands after a compilation stage
    Emit {
        /// Path to the file to compile
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Compilation stage to stop after
        #[arg(short, long, value_enum, default_value_t = StageArg::Js)]
        stage: StageArg,
        #[command(flatten)]
        conf: ConfArgs,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Start a REPL
    Repl {
        #[command(flatten)]
        conf: ConfArgs,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
}

/// Overrides for the configuration file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfArgs {
    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Guarded entries allowed before the stack is unwound
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub budget: Option<u64>,
    /// Reject globals that are read but never assigned
    #[arg(long, default_value_t = false)]
    pub strict: bool,
    /// Skip the optimizer
    #[arg(long, default_value_t = false)]
    pub no_opt: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    Ast,
    Cps,
    Opt,
    Js,
}
