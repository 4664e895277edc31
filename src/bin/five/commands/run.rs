//! `five run` command

use anyhow::Result;

use crate::cli::RunArgs;
use five::ops::five_run::{run, RunOptions};
use five::util::shell::{Shell, Status};
use five::util::GlobalContext;

pub fn execute(args: RunArgs, ctx: &GlobalContext, shell: &Shell) -> Result<i32> {
    let config = ctx.config();

    let mut opts = RunOptions::new(args.file);
    opts.scratch_dir = config.run.scratch_dir;

    if ctx.is_verbose() {
        shell.status(Status::Running, opts.bundle.display());
    }

    let code = run(&opts)?;
    Ok(code)
}
