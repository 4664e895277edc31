//! `five version` command and the no-argument usage text

use anyhow::Result;

fn banner() -> String {
    format!("Five Programming Language v{}", env!("CARGO_PKG_VERSION"))
}

pub fn execute() -> Result<i32> {
    println!("{}", banner());
    Ok(0)
}

pub fn usage() -> Result<i32> {
    println!("{}", banner());
    println!("Usage:");
    println!("  five compile <file.five>     - Compile project");
    println!("  five run <file.app>          - Execute application");
    println!("  five version                 - Show version");
    Ok(0)
}
