//! Recursive-descent parser for `.five` manifests.
//!
//! The parser builds a [`Manifest`] directly from the token stream; there is
//! no intermediate syntax tree. Supported statements:
//!
//! ```text
//! project.<field> = "<value>"
//! require "<module>"
//! shell.set = "<interpreter command>"
//! shell.run("<command>")
//! files.add("folder", "<name>")
//! files.add("file", "<src>", "<dest>")
//! define class "shell"
//!     function "main"
//!         <payload>
//! ```
//!
//! Once the `main` signature is parsed the rest of the source is the payload,
//! sliced from the original text at the offset where the lexer stopped.

use thiserror::Error;
use tracing::{debug, info};

use super::lexer::Lexed;
use super::manifest::{FileMapping, Manifest, ProjectField, MAIN_FUNCTION, SHELL_CLASS};
use super::token::{Token, TokenKind};

/// Error raised while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected token: {found}")]
    UnexpectedToken {
        found: String,
        line: usize,
        column: usize,
    },

    #[error("expected {expected}, got {found}")]
    Expected {
        expected: TokenKind,
        found: String,
        line: usize,
        column: usize,
    },

    #[error("expected string value for project property")]
    ExpectedPropertyValue { line: usize, column: usize },

    #[error("unknown project property: {field}")]
    UnknownProjectField {
        field: String,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    /// 1-based (line, column) of the offending token.
    pub fn position(&self) -> (usize, usize) {
        match *self {
            ParseError::UnexpectedToken { line, column, .. }
            | ParseError::Expected { line, column, .. }
            | ParseError::ExpectedPropertyValue { line, column }
            | ParseError::UnknownProjectField { line, column, .. } => (line, column),
        }
    }

    fn unexpected(token: &Token) -> Self {
        ParseError::UnexpectedToken {
            found: token.describe(),
            line: token.line,
            column: token.column,
        }
    }
}

/// Whether parsing should keep going after a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
}

/// Parser over one lexed source.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    source: &'a str,
    stop_offset: Option<usize>,
    pos: usize,
    /// Returned if the tokens run out before an EOF token.
    eof: Token,
    manifest: Manifest,
}

impl<'a> Parser<'a> {
    /// Create a parser from lexer output and the text it was lexed from.
    pub fn new(lexed: Lexed, source: &'a str) -> Self {
        let (line, column) = lexed
            .tokens
            .last()
            .map(|t| (t.line, t.column + t.text.chars().count()))
            .unwrap_or((1, 1));

        Parser {
            tokens: lexed.tokens,
            source,
            stop_offset: lexed.stop_offset,
            pos: 0,
            eof: Token::new(TokenKind::Eof, "", line, column),
            manifest: Manifest::new(),
        }
    }

    /// Parse every statement and return the filled-in manifest.
    pub fn parse(mut self) -> Result<Manifest, ParseError> {
        self.skip_trivia();

        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Comment => self.advance(),
                TokenKind::Project => self.parse_project()?,
                TokenKind::Require => self.parse_require()?,
                TokenKind::Identifier => self.parse_module_call()?,
                TokenKind::Define => {
                    if self.parse_define()? == Flow::Done {
                        break;
                    }
                }
                _ => return Err(ParseError::unexpected(self.current())),
            }
        }

        Ok(self.manifest)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.current().clone();
        if token.kind != kind {
            return Err(ParseError::Expected {
                expected: kind,
                found: token.describe(),
                line: token.line,
                column: token.column,
            });
        }
        self.advance();
        Ok(token)
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        self.expect(TokenKind::String).map(|t| t.text)
    }

    fn skip_trivia(&mut self) {
        while self.current().kind.is_trivia() {
            self.advance();
        }
    }

    /// `project . <field> = "<value>"`
    fn parse_project(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Project)?;
        self.expect(TokenKind::Dot)?;
        let field = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Equals)?;

        let value = self.current().clone();
        if value.kind != TokenKind::String {
            return Err(ParseError::ExpectedPropertyValue {
                line: value.line,
                column: value.column,
            });
        }
        self.advance();

        let Some(known) = ProjectField::parse(&field.text) else {
            return Err(ParseError::UnknownProjectField {
                field: field.text,
                line: field.line,
                column: field.column,
            });
        };
        self.manifest.project.set(known, value.text);

        self.skip_trivia();
        Ok(())
    }

    /// `require "<module>"`
    fn parse_require(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Require)?;
        let module = self.expect_string()?;
        self.manifest.requires.push(module);
        self.skip_trivia();
        Ok(())
    }

    /// `<module> . <method> ...`
    ///
    /// Unknown module/method pairs are consumed up to the method name and
    /// otherwise ignored.
    fn parse_module_call(&mut self) -> Result<(), ParseError> {
        let module = self.current().text.clone();
        self.advance();
        self.expect(TokenKind::Dot)?;
        let method = self.expect(TokenKind::Identifier)?.text;

        match (module.as_str(), method.as_str()) {
            ("shell", "set") => {
                self.expect(TokenKind::Equals)?;
                self.manifest.shell.interpreter = Some(self.expect_string()?);
            }
            ("shell", "run") => {
                self.expect(TokenKind::LParen)?;
                let command = self.expect_string()?;
                self.expect(TokenKind::RParen)?;
                self.manifest.shell.run_commands.push(command);
            }
            ("files", "add") => self.parse_files_add()?,
            _ => debug!("ignoring `{}.{}`", module, method),
        }

        self.skip_trivia();
        Ok(())
    }

    fn parse_files_add(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::LParen)?;
        let kind = self.expect_string()?;
        self.expect(TokenKind::Comma)?;

        match kind.as_str() {
            "folder" => {
                let folder = self.expect_string()?;
                info!("folder `{}` added", folder);
                self.manifest.files.folders.push(folder);
                self.expect(TokenKind::RParen)?;
            }
            "file" => {
                let source = self.expect_string()?;
                self.expect(TokenKind::Comma)?;
                let dest = self.expect_string()?;
                info!("file `{}` added as `{}`", source, dest);
                self.manifest.files.files.push(FileMapping { source, dest });
                self.expect(TokenKind::RParen)?;
            }
            other => debug!("ignoring files.add of unknown kind `{}`", other),
        }

        Ok(())
    }

    /// `define class "<name>"` followed by an indented `function "<name>"`.
    fn parse_define(&mut self) -> Result<Flow, ParseError> {
        self.expect(TokenKind::Define)?;
        self.expect(TokenKind::Class)?;
        let class = self.expect_string()?;
        self.skip_trivia();
        self.expect(TokenKind::Indent)?;

        if class == SHELL_CLASS {
            self.manifest.declarations.shell_class = true;
        }

        self.expect(TokenKind::Function)?;
        let function = self.expect_string()?;
        self.skip_trivia();

        if function == MAIN_FUNCTION {
            self.manifest.declarations.main_function = true;
            self.manifest.payload = extract_payload(self.source, self.stop_offset);
            debug!(bytes = self.manifest.payload.len(), "payload captured");
            return Ok(Flow::Done);
        }

        // Close the class block so the next statement starts at the top level.
        if self.current().kind == TokenKind::Dedent {
            self.advance();
        }

        Ok(Flow::Continue)
    }
}

/// Slice the payload out of the original source.
///
/// The payload is every line after the one holding the `main` signature,
/// trimmed. `stop_offset` is the lexer's stop position on that line.
pub fn extract_payload(source: &str, stop_offset: Option<usize>) -> String {
    let Some(offset) = stop_offset else {
        return String::new();
    };

    match source.get(offset..).and_then(|rest| rest.find('\n')) {
        Some(newline) => source[offset + newline + 1..].trim().to_string(),
        None => String::new(),
    }
}
