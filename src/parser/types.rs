//! Parser Types and Constants
//!
//! Shared types, limits, and errors used across parser modules.

use std::fmt;
use thiserror::Error;

// Parser limits to prevent hangs and resource exhaustion
pub const MAX_INPUT_SIZE: usize = 1_000_000; // 1M chars max input
pub const MAX_PARSER_DEPTH: usize = 200; // Max nesting of ${...} inside defaults/messages

/// Characters allowed in an identifier run
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Characters that may start a bare `$NAME` reference
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Tunable limits for a single parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Longest accepted input, in chars
    pub max_input_size: usize,
    /// Deepest accepted nesting of brace expansions
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_input_size: MAX_INPUT_SIZE,
            max_depth: MAX_PARSER_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A `${` with no matching `}` before end of input
    #[error("unterminated expansion")]
    Unterminated,
    /// A `${NAME` followed by something no expansion form accepts
    #[error("malformed expansion")]
    Malformed,
    #[error("input too large")]
    InputTooLarge,
    #[error("expansions nested too deeply")]
    NestingTooDeep,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseException {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Char index into the input
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error at {}:{}: {}", self.line, self.column, self.message)
    }
}

impl ParseException {
    /// Build an error for `offset`, deriving the 1-based line and column from `input`.
    pub fn at(kind: ParseErrorKind, message: impl Into<String>, input: &[char], offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for &c in input.iter().take(offset) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            kind,
            message: message.into(),
            offset,
            line,
            column,
        }
    }
}
