use clap::Parser;
use colored::Colorize;
use lscript_cli::{Cli, Commands, Repl};
use lscript_driver::{Compiler, Result};

fn main() {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        | Commands::Run { verbose, .. }
        | Commands::Emit { verbose, .. }
        | Commands::Repl { verbose, .. } => *verbose,
    };
    let mut logger = env_logger::Builder::from_default_env();
    if verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        | Commands::Run { file, conf, direct, verbose: _ } => {
            let compiler = Compiler::new(conf.conf()?);
            let source = std::fs::read_to_string(&file)?;
            log::info!("running `{}`", file.display());
            let value =
                if direct { compiler.run_direct(&source)? } else { compiler.run(&source)? };
            println!("{}", value);
        }
        | Commands::Emit { file, stage, conf, verbose: _ } => {
            let compiler = Compiler::new(conf.conf()?);
            let source = std::fs::read_to_string(&file)?;
            println!("{}", compiler.emit(&source, stage.into())?);
        }
        | Commands::Repl { conf, verbose: _ } => {
            Repl::new(Compiler::new(conf.conf()?)).launch()?;
        }
    }
    Ok(())
}
