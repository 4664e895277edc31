//! Five CLI - compiles `.five` manifests and runs `.app` bundles

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use five::util::{FiveError, GlobalContext, Shell};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.no_color);

    // Set up logging
    let default_filter = if cli.quiet {
        "five=warn"
    } else if cli.verbose {
        "five=debug"
    } else {
        "five=info"
    };
    let filter =
        EnvFilter::try_from_env("FIVE_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let code = match run(cli, &shell) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<FiveError>() {
                Some(err) => eprint!("{}", err.to_diagnostic().format(shell.use_color())),
                None => eprintln!("error: unexpected error: {:#}", e),
            }
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli, shell: &Shell) -> Result<i32> {
    if cli.version {
        return commands::version::execute();
    }

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(shell.is_verbose());

    // Execute command
    match cli.command {
        Some(Commands::Compile(args)) => commands::compile::execute(args, &ctx, shell),
        Some(Commands::Run(args)) => commands::run::execute(args, &ctx, shell),
        Some(Commands::Version) => commands::version::execute(),
        None => commands::version::usage(),
    }
}
