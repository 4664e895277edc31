//! `five compile` command

use std::path::Path;

use anyhow::Result;

use crate::cli::CompileArgs;
use five::ops::five_compile::{compile, CompileOptions};
use five::util::shell::{Shell, Status};
use five::util::GlobalContext;

pub fn execute(args: CompileArgs, ctx: &GlobalContext, shell: &Shell) -> Result<i32> {
    let config = ctx.config();

    // --out-dir > config > current directory
    let out_dir = args
        .out_dir
        .or(config.compile.out_dir)
        .unwrap_or_else(|| ctx.cwd().to_path_buf());

    let opts = CompileOptions {
        source: args.file,
        out_dir,
    };
    let result = compile(&opts, shell)?;

    let shown = display_path(&result.bundle_path, ctx.cwd());
    shell.status(
        Status::Finished,
        format!("{} (run it with \"five run {}\")", shown, shown),
    );

    Ok(0)
}

/// Show `path` relative to `cwd` when it lives underneath it.
fn display_path(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .display()
        .to_string()
}
