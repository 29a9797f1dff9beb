//! Parser module for expansion templates
//!
//! This module contains the scanner/parser that turns a template string into
//! an `Expression`.

pub mod types;
pub mod parser;
pub mod expansion_parser;

// Re-exports
pub use types::{ParseErrorKind, ParseException, ParserOptions};
pub use parser::{parse, Parser};
