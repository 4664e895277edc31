//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Five - compile `.five` manifests into `.app` bundles and run them
#[derive(Parser)]
#[command(name = "five")]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Print the version banner
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a .five manifest into a .app bundle
    Compile(CompileArgs),

    /// Run a .app bundle
    Run(RunArgs),

    /// Print the version banner
    Version,
}

#[derive(Args)]
pub struct CompileArgs {
    /// Manifest to compile
    #[arg(value_name = "FILE.five")]
    pub file: PathBuf,

    /// Directory to write the bundle to (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Bundle to run
    #[arg(value_name = "FILE.app")]
    pub file: PathBuf,
}
