//! Manifest front end: lexing, parsing and validation of `.five` sources.

pub mod lexer;
pub mod manifest;
pub mod parser;
pub mod platform;
pub mod token;
pub mod validate;

pub use manifest::Manifest;
pub use platform::{HostFamily, Platform};
pub use validate::{validate, ValidManifest, ValidationError};

use crate::util::diagnostic::FiveResult;

/// Lex and parse a manifest source.
pub fn parse_manifest(source: &str) -> FiveResult<Manifest> {
    let lexed = lexer::tokenize(source)?;
    let manifest = parser::Parser::new(lexed, source).parse()?;
    Ok(manifest)
}
