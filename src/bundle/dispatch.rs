//! Hands a loaded bundle's payload to its interpreter.
//!
//! The run command is split on whitespace and the payload file name is
//! appended as the last argument. Quoting is not supported: a `run` string
//! such as `python3 "my script.py"` is split into three words.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::util::process::ProcessBuilder;

/// Error preparing or spawning the dispatched process.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("bundle has an empty run command")]
    EmptyCommand,

    #[error("interpreter `{program}` not found")]
    InterpreterNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to execute `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Fully resolved command line for a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; the bundle's scratch workspace.
    pub cwd: PathBuf,
}

impl DispatchCommand {
    /// Build the command for `run`, passing `payload` as the final argument.
    pub fn from_run(run: &str, payload: &str, cwd: &Path) -> Result<Self, DispatchError> {
        let mut words = run.split_whitespace();
        let program = words.next().ok_or(DispatchError::EmptyCommand)?;
        let mut args: Vec<String> = words.map(str::to_string).collect();
        args.push(payload.to_string());

        Ok(DispatchCommand {
            program: program.to_string(),
            args,
            cwd: cwd.to_path_buf(),
        })
    }

    /// The command line as the user would type it.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Captured result of a dispatched process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutput {
    pub code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs dispatch commands.
pub trait Executor {
    /// Run `command` to completion and capture its output.
    fn execute(&self, command: &DispatchCommand) -> Result<DispatchOutput, DispatchError>;
}

/// Executor that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, command: &DispatchCommand) -> Result<DispatchOutput, DispatchError> {
        let program = which::which_in(&command.program, std::env::var_os("PATH"), &command.cwd)
            .map_err(|source| DispatchError::InterpreterNotFound {
                program: command.program.clone(),
                source,
            })?;

        let process = ProcessBuilder::new(&program)
            .args(&command.args)
            .cwd(&command.cwd);
        debug!(
            program = %process.get_program().display(),
            cwd = %command.cwd.display(),
            "dispatching `{}`",
            process.display_command()
        );

        let output = process.exec().map_err(|source| DispatchError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        let code = output.status.code().unwrap_or_else(|| {
            warn!("`{}` terminated without an exit code", command.program);
            1
        });

        Ok(DispatchOutput {
            code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
