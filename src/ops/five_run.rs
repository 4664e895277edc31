//! Implementation of `five run`.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bundle::{
    DispatchCommand, Executor, LoadedBundle, SystemExecutor, BUNDLE_EXTENSION, CODE_ENTRY,
};
use crate::core::platform::HostFamily;
use crate::util::diagnostic::{FiveError, FiveResult};

/// Options for running a bundle.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The `.app` bundle to run
    pub bundle: PathBuf,

    /// Parent directory of the scratch workspace (None = system temp dir)
    pub scratch_dir: Option<PathBuf>,

    /// Host family the bundle's platform is checked against
    pub host: HostFamily,
}

impl RunOptions {
    /// Options for running `bundle` on the current host.
    pub fn new(bundle: impl Into<PathBuf>) -> Self {
        RunOptions {
            bundle: bundle.into(),
            scratch_dir: None,
            host: HostFamily::current(),
        }
    }
}

/// Run a bundle with real processes, forwarding its output to this
/// process's stdout and stderr. Returns the program's exit code.
pub fn run(opts: &RunOptions) -> FiveResult<i32> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run_with(opts, &SystemExecutor, &mut stdout.lock(), &mut stderr.lock())
}

/// Run a bundle through `executor`, writing the program's captured output to
/// `stdout` and `stderr`.
pub fn run_with(
    opts: &RunOptions,
    executor: &dyn Executor,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> FiveResult<i32> {
    if !opts.bundle.extension().is_some_and(|ext| ext == BUNDLE_EXTENSION) {
        return Err(FiveError::WrongExtension {
            expected: BUNDLE_EXTENSION,
        });
    }

    let scratch_parent = opts.scratch_dir.clone().unwrap_or_else(std::env::temp_dir);
    let bundle = LoadedBundle::open_in(&opts.bundle, &scratch_parent)?;
    let settings = bundle.settings();

    if !settings.platform.supports(opts.host) {
        return Err(FiveError::PlatformMismatch {
            declared: settings.platform,
            host: opts.host,
        });
    }

    let command = DispatchCommand::from_run(&settings.run, CODE_ENTRY, bundle.root())?;
    debug!(project = %settings.project, "running `{}`", command.display_command());

    let output = executor.execute(&command)?;
    forward(stdout, &output.stdout)?;
    forward(stderr, &output.stderr)?;

    bundle.close()?;
    Ok(output.code)
}

fn forward(out: &mut dyn Write, bytes: &[u8]) -> FiveResult<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    out.write_all(bytes)
        .and_then(|()| out.flush())
        .map_err(|e| FiveError::io("write", Path::new("<output>"), e))
}
