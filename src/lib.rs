//! introduce - shell-style variable expansion templates
//!
//! This library parses strings such as `Hello ${NAME:-world}` into a tree of
//! literal text and expansions, without evaluating anything. Resolving the
//! identifiers and rendering the result is left to the caller.

pub mod ast;
pub mod parser;

pub use ast::types::*;
pub use parser::{parse, ParseErrorKind, ParseException, Parser, ParserOptions};
