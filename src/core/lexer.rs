//! Indentation-aware lexer for `.five` manifest sources.
//!
//! The lexer makes a single pass over the source. Indentation is only
//! significant at the start of a line: deeper lines emit one INDENT, shallower
//! lines emit one DEDENT per popped level. Blank lines and comment-only lines
//! never touch the indent stack.
//!
//! Scanning stops for good right after the string of a `function "main"`
//! signature. Everything after that point is opaque payload and is never
//! tokenized; the byte offset where scanning stopped is reported in
//! [`Lexed::stop_offset`] so the parser can slice the payload from the
//! original text. Open levels are still closed with DEDENTs and an EOF at the
//! stop position, so INDENT and DEDENT counts always match.

use thiserror::Error;
use tracing::debug;

use super::token::{Token, TokenKind};

/// Width contributed by a tab character when measuring indentation.
pub const TAB_WIDTH: usize = 4;

/// Error raised while lexing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string")]
    UnterminatedString { line: usize, column: usize },

    #[error("unexpected character: {ch}")]
    UnexpectedCharacter { ch: char, line: usize, column: usize },
}

impl LexError {
    /// 1-based (line, column) of the error.
    pub fn position(&self) -> (usize, usize) {
        match *self {
            LexError::UnterminatedString { line, column }
            | LexError::UnexpectedCharacter { line, column, .. } => (line, column),
        }
    }
}

/// Result of lexing a source document.
#[derive(Debug, Clone)]
pub struct Lexed {
    /// Tokens in source order.
    pub tokens: Vec<Token>,
    /// Byte offset just past the `"main"` string when the early stop fired.
    ///
    /// `None` means the whole source was tokenized. Either way the token list
    /// ends with an EOF token.
    pub stop_offset: Option<usize>,
}

impl Lexed {
    /// Number of tokens of the given kind.
    pub fn count(&self, kind: TokenKind) -> usize {
        self.tokens.iter().filter(|t| t.kind == kind).count()
    }
}

/// Outcome of measuring a new line's indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentChange {
    Same,
    Indent,
    Dedent(usize),
}

/// Stack of open indentation widths. Never empty; the bottom is always 0.
#[derive(Debug)]
struct IndentStack {
    widths: Vec<usize>,
}

impl IndentStack {
    fn new() -> Self {
        IndentStack { widths: vec![0] }
    }

    fn top(&self) -> usize {
        self.widths.last().copied().unwrap_or(0)
    }

    fn adjust(&mut self, width: usize) -> IndentChange {
        let top = self.top();
        if width > top {
            self.widths.push(width);
            IndentChange::Indent
        } else if width < top {
            let mut popped = 0;
            // A width between two open levels lands on the nearest lower one.
            while self.widths.len() > 1 && self.top() > width {
                self.widths.pop();
                popped += 1;
            }
            IndentChange::Dedent(popped)
        } else {
            IndentChange::Same
        }
    }

    /// Close every open level, returning how many were closed.
    fn drain(&mut self) -> usize {
        let open = self.widths.len() - 1;
        self.widths.truncate(1);
        open
    }
}

/// A single lexing session over one source text.
///
/// The session is consumed by [`Lexer::tokenize`]; it cannot be restarted.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    indents: IndentStack,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            indents: IndentStack::new(),
        }
    }

    /// Tokenize the whole source.
    pub fn tokenize(mut self) -> Result<Lexed, LexError> {
        let mut line_start = true;
        let mut stop_offset = None;

        while let Some(c) = self.current() {
            let (line, column) = (self.line, self.column);

            if line_start {
                line_start = false;
                let line_pos = self.pos;
                self.skip_whitespace();

                match self.current() {
                    Some('>') => {
                        let comment_column = self.column;
                        let text = self.read_comment();
                        self.push(TokenKind::Comment, text, line, comment_column);
                        if self.current() == Some('\n') {
                            self.advance();
                            line_start = true;
                        }
                    }
                    Some('\n') => {
                        self.advance();
                        line_start = true;
                    }
                    Some(_) => self.handle_indentation(line_pos),
                    None => {}
                }
                continue;
            }

            match c {
                ' ' | '\t' | '\r' => self.skip_whitespace(),
                '\n' => {
                    self.push(TokenKind::Newline, "\n", line, column);
                    self.advance();
                    line_start = true;
                }
                '>' => {
                    let text = self.read_comment();
                    self.push(TokenKind::Comment, text, line, column);
                }
                '"' | '\'' => {
                    let value = self.read_string(line, column)?;
                    let is_main = value == "main";
                    self.push(TokenKind::String, value, line, column);

                    if is_main && self.follows_function_keyword() {
                        debug!(offset = self.pos, line, "main signature reached, lexing stopped");
                        stop_offset = Some(self.pos);
                        break;
                    }
                }
                c if c.is_ascii_digit() => {
                    let value = self.read_number();
                    self.push(TokenKind::Number, value, line, column);
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let word = self.read_identifier();
                    self.push(TokenKind::from_word(&word), word, line, column);
                }
                c => match TokenKind::from_operator(c) {
                    Some(kind) => {
                        self.push(kind, c.to_string(), line, column);
                        self.advance();
                    }
                    None => return Err(LexError::UnexpectedCharacter { ch: c, line, column }),
                },
            }
        }

        for _ in 0..self.indents.drain() {
            self.push(TokenKind::Dedent, "", self.line, self.column);
        }
        self.push(TokenKind::Eof, "", self.line, self.column);

        Ok(Lexed {
            tokens: self.tokens,
            stop_offset,
        })
    }

    fn current(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, text, line, column));
    }

    /// The token before the string just pushed is a `function` keyword.
    fn follows_function_keyword(&self) -> bool {
        let n = self.tokens.len();
        n >= 2 && self.tokens[n - 2].kind == TokenKind::Function
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(' ' | '\t' | '\r')) {
            self.advance();
        }
    }

    fn handle_indentation(&mut self, line_pos: usize) {
        let width: usize = self.source[line_pos..]
            .chars()
            .take_while(|c| matches!(c, ' ' | '\t' | '\r'))
            .map(|c| match c {
                ' ' => 1,
                '\t' => TAB_WIDTH,
                _ => 0,
            })
            .sum();

        match self.indents.adjust(width) {
            IndentChange::Indent => self.push(TokenKind::Indent, "", self.line, self.column),
            IndentChange::Dedent(levels) => {
                for _ in 0..levels {
                    self.push(TokenKind::Dedent, "", self.line, self.column);
                }
            }
            IndentChange::Same => {}
        }
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<String, LexError> {
        let quote = self.current();
        self.advance();
        let mut value = String::new();

        loop {
            match self.current() {
                None => return Err(LexError::UnterminatedString { line, column }),
                Some(c) if Some(c) == quote => break,
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.current() {
                        value.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        });
                        self.advance();
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        self.advance();
        Ok(value)
    }

    fn read_number(&mut self) -> String {
        let mut value = String::new();
        let mut seen_dot = false;

        while let Some(c) = self.current() {
            if c == '.' {
                if seen_dot {
                    break;
                }
                seen_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            value.push(c);
            self.advance();
        }

        value
    }

    fn read_identifier(&mut self) -> String {
        let mut value = String::new();
        while let Some(c) = self.current() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            value.push(c);
            self.advance();
        }
        value
    }

    fn read_comment(&mut self) -> String {
        self.advance();
        let start = self.pos;
        while !matches!(self.current(), None | Some('\n')) {
            self.advance();
        }
        self.source[start..self.pos].trim().to_string()
    }
}

/// Tokenize a source document.
pub fn tokenize(source: &str) -> Result<Lexed, LexError> {
    Lexer::new(source).tokenize()
}
