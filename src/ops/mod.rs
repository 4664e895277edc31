//! High-level operations.
//!
//! This module contains the implementation of Five commands.

pub mod five_compile;
pub mod five_run;

pub use five_compile::{compile, CompileOptions, CompileResult};
pub use five_run::{run, run_with, RunOptions};
