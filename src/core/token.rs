//! Tokens produced by the manifest lexer.

use std::fmt;

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    Project,
    Require,
    Define,
    Class,
    Function,

    // Operators
    Dot,
    Equals,
    LParen,
    RParen,
    Comma,
    Colon,

    // Layout
    Newline,
    Indent,
    Dedent,
    Comment,
    Eof,
}

impl TokenKind {
    /// Classify an identifier, returning the keyword kind for reserved words.
    pub fn from_word(word: &str) -> TokenKind {
        match word {
            "project" => TokenKind::Project,
            "require" => TokenKind::Require,
            "define" => TokenKind::Define,
            "class" => TokenKind::Class,
            "function" => TokenKind::Function,
            _ => TokenKind::Identifier,
        }
    }

    /// Kind for a single-character operator.
    pub fn from_operator(c: char) -> Option<TokenKind> {
        match c {
            '.' => Some(TokenKind::Dot),
            '=' => Some(TokenKind::Equals),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            _ => None,
        }
    }

    /// Human-readable name used in parse errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Project => "project",
            TokenKind::Require => "require",
            TokenKind::Define => "define",
            TokenKind::Class => "class",
            TokenKind::Function => "function",
            TokenKind::Dot => ".",
            TokenKind::Equals => "=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Newline => "newline",
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of input",
        }
    }

    /// Whether the parser may skip this token between statements.
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Comment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token with its text and 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// The token's literal text, or its kind name for layout tokens with no text.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline => "newline".to_string(),
            _ if self.text.is_empty() => self.kind.as_str().to_string(),
            _ => self.text.clone(),
        }
    }
}
