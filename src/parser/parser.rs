//! Recursive Descent Parser for Expansion Templates
//!
//! A single forward pass over the input chars. Literal text accumulates in a
//! pending buffer which is flushed as a `Text` item whenever an escape or
//! expansion starts, so item boundaries follow the scan exactly.
//!
//! Grammar (simplified):
//!   expression ::= (text | '\\\\' | escape | dollar)*
//!   escape     ::= '\$' ('{' raw '}' | ident*) | '$$' ident*
//!   dollar     ::= '${' brace | '$' ident-start ident* | '$(' | '$'
//!   brace      ::= ident* (':-' expression | '-' expression
//!                         | ':' int [':' int] | '?' expression | '') '}'

use crate::ast::types::{
    EscapedExpansion, Expansion, Expression, ExpressionItem, VariableExpansion,
};
use crate::parser::types::{
    is_identifier_start, ParseErrorKind, ParseException, ParserOptions,
};

/// Main parser struct
///
/// One parser handles one input; `parse` consumes it.
pub struct Parser {
    pub(super) chars: Vec<char>,
    pub(super) pos: usize,
    pub(super) depth: usize,
    pub(super) options: ParserOptions,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self::with_options(input, ParserOptions::default())
    }

    pub fn with_options(input: &str, options: ParserOptions) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
            options,
        }
    }

    /// Parse the whole input into an expression.
    pub fn parse(mut self) -> Result<Expression, ParseException> {
        if self.chars.len() > self.options.max_input_size {
            return Err(self.error(
                ParseErrorKind::InputTooLarge,
                format!(
                    "input is {} chars, limit is {}",
                    self.chars.len(),
                    self.options.max_input_size
                ),
                0,
            ));
        }
        let items = self.parse_expression(None)?;
        Ok(Expression::new(items))
    }

    // =========================================================================
    // CURSOR
    // =========================================================================

    pub(super) fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(super) fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    pub(super) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    pub(super) fn error(
        &self,
        kind: ParseErrorKind,
        message: impl Into<String>,
        offset: usize,
    ) -> ParseException {
        ParseException::at(kind, message, &self.chars, offset)
    }

    pub(super) fn unterminated(&self, start: usize) -> ParseException {
        self.error(
            ParseErrorKind::Unterminated,
            "unexpected EOF while looking for matching '}'",
            start,
        )
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// Parse items until end of input, or, for default/message content opened
    /// by the `$` at `opened_at`, until the closing `}` (left unconsumed).
    pub(super) fn parse_expression(
        &mut self,
        opened_at: Option<usize>,
    ) -> Result<Vec<ExpressionItem>, ParseException> {
        let nested = opened_at.is_some();
        let mut items = Vec::new();
        let mut text = String::new();
        // Bare braces inside nested content must balance before `}` closes it
        let mut literal_depth = 0usize;

        loop {
            let Some(c) = self.peek() else {
                if let Some(start) = opened_at {
                    return Err(self.unterminated(start));
                }
                break;
            };
            match c {
                '}' if nested && literal_depth == 0 => break,
                '{' if nested => {
                    literal_depth += 1;
                    text.push(c);
                    self.advance(1);
                }
                '}' if nested => {
                    literal_depth -= 1;
                    text.push(c);
                    self.advance(1);
                }
                '\\' => self.parse_backslash(&mut items, &mut text)?,
                '$' => self.parse_dollar(&mut items, &mut text)?,
                c => {
                    text.push(c);
                    self.advance(1);
                }
            }
        }

        flush_text(&mut items, &mut text);
        Ok(items)
    }

    fn parse_backslash(
        &mut self,
        items: &mut Vec<ExpressionItem>,
        text: &mut String,
    ) -> Result<(), ParseException> {
        match self.peek_at(1) {
            Some('\\') => {
                flush_text(items, text);
                items.push(ExpressionItem::Text("\\\\".to_string()));
                self.advance(2);
            }
            Some('$') => {
                flush_text(items, text);
                let start = self.pos;
                self.advance(2);
                let identifier = if self.peek() == Some('{') {
                    self.scan_escaped_braces(start)?
                } else {
                    self.take_identifier()
                };
                items.push(ExpressionItem::Expansion(Expansion::Escaped(EscapedExpansion {
                    identifier,
                })));
            }
            _ => {
                text.push('\\');
                self.advance(1);
            }
        }
        Ok(())
    }

    fn parse_dollar(
        &mut self,
        items: &mut Vec<ExpressionItem>,
        text: &mut String,
    ) -> Result<(), ParseException> {
        flush_text(items, text);
        match self.peek_at(1) {
            Some('$') => {
                self.advance(2);
                let identifier = self.take_identifier();
                items.push(ExpressionItem::Expansion(Expansion::Escaped(EscapedExpansion {
                    identifier,
                })));
            }
            Some('{') => {
                let expansion = self.parse_brace_expansion()?;
                items.push(ExpressionItem::Expansion(expansion));
            }
            Some(c) if is_identifier_start(c) => {
                self.advance(1);
                let identifier = self.take_identifier();
                items.push(ExpressionItem::Expansion(Expansion::Variable(VariableExpansion {
                    identifier,
                })));
            }
            Some('(') => {
                // Command substitution opener; its body stays plain text
                items.push(ExpressionItem::Text("$(".to_string()));
                self.advance(2);
            }
            _ => {
                items.push(ExpressionItem::Text("$".to_string()));
                self.advance(1);
            }
        }
        Ok(())
    }
}

fn flush_text(items: &mut Vec<ExpressionItem>, text: &mut String) {
    if !text.is_empty() {
        items.push(ExpressionItem::Text(std::mem::take(text)));
    }
}

/// Parse a template with default limits.
pub fn parse(input: &str) -> Result<Expression, ParseException> {
    Parser::new(input).parse()
}
