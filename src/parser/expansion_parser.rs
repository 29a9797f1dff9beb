//! Expansion Parser
//!
//! Handles `${...}` brace expansions and the raw captures behind escaped
//! dollars. The expansion kinds share prefixes, so the form is picked from at
//! most two chars of lookahead after the identifier, first match wins:
//!
//!   `:-`  default when unset or empty
//!   `-`   default when unset
//!   `:`   substring offset, optionally `:length`
//!   `?`   required, with a message
//!   `}`   plain reference

use crate::ast::types::{
    EmptyValueExpansion, Expansion, Expression, RequiredExpansion, SubstringExpansion,
    UnsetValueExpansion, VariableExpansion,
};
use crate::parser::parser::Parser;
use crate::parser::types::{is_identifier_char, ParseErrorKind, ParseException};

impl Parser {
    /// Parse a brace expansion with the cursor on its `$`.
    pub(super) fn parse_brace_expansion(&mut self) -> Result<Expansion, ParseException> {
        let start = self.pos;
        // Skip ${
        self.advance(2);
        let identifier = self.take_identifier();

        match (self.peek(), self.peek_at(1)) {
            (Some(':'), Some('-')) => {
                self.advance(2);
                let content = self.parse_nested(start)?;
                Ok(Expansion::EmptyValue(EmptyValueExpansion { identifier, content }))
            }
            (Some('-'), _) => {
                self.advance(1);
                let content = self.parse_nested(start)?;
                Ok(Expansion::UnsetValue(UnsetValueExpansion { identifier, content }))
            }
            (Some(':'), _) => {
                self.advance(1);
                self.parse_substring(start, identifier)
            }
            (Some('?'), _) => {
                self.advance(1);
                let message = self.parse_nested(start)?;
                Ok(Expansion::Required(RequiredExpansion { identifier, message }))
            }
            (Some('}'), _) => {
                self.advance(1);
                Ok(Expansion::Variable(VariableExpansion { identifier }))
            }
            (None, _) => Err(self.unterminated(start)),
            (Some(_), _) => Err(self.malformed(start)),
        }
    }

    /// Parse default/message content and consume its closing brace.
    fn parse_nested(&mut self, start: usize) -> Result<Expression, ParseException> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(
                ParseErrorKind::NestingTooDeep,
                format!("expansions nested deeper than {}", self.options.max_depth),
                start,
            ));
        }
        self.depth += 1;
        let items = self.parse_expression(Some(start))?;
        self.depth -= 1;
        // parse_expression only returns Ok(..) for nested content when sitting on '}'
        self.advance(1);
        Ok(Expression::new(items))
    }

    /// Cursor is just past the first `:`.
    fn parse_substring(
        &mut self,
        start: usize,
        identifier: String,
    ) -> Result<Expansion, ParseException> {
        let offset = self.parse_signed(start)?;
        let length = if self.peek() == Some(':') {
            self.advance(1);
            Some(self.parse_signed(start)?)
        } else {
            None
        };

        match self.peek() {
            Some('}') => {
                self.advance(1);
                Ok(Expansion::Substring(SubstringExpansion {
                    identifier,
                    offset,
                    length: length.unwrap_or(0),
                    has_length: length.is_some(),
                }))
            }
            None => Err(self.unterminated(start)),
            Some(_) => Err(self.malformed(start)),
        }
    }

    /// Whitespace, an optional '-', then at least one digit.
    fn parse_signed(&mut self, start: usize) -> Result<i64, ParseException> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance(1);
        }
        let negative = self.peek() == Some('-');
        if negative {
            self.advance(1);
        }

        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1);
        }
        if self.pos == digits_start {
            return Err(match self.peek() {
                None => self.unterminated(start),
                Some(_) => self.malformed(start),
            });
        }

        let mut literal = String::with_capacity(self.pos - digits_start + 1);
        if negative {
            literal.push('-');
        }
        literal.extend(&self.chars[digits_start..self.pos]);
        literal.parse::<i64>().map_err(|_| {
            self.error(
                ParseErrorKind::Malformed,
                format!("substring value out of range: {}", literal),
                digits_start,
            )
        })
    }

    fn malformed(&self, start: usize) -> ParseException {
        let end = self.chars[self.pos..]
            .iter()
            .position(|&c| c == '}')
            .map_or(self.chars.len(), |i| self.pos + i + 1);
        let text: String = self.chars[start..end].iter().collect();
        self.error(
            ParseErrorKind::Malformed,
            format!("{}: bad substitution", text),
            start,
        )
    }

    // =========================================================================
    // ESCAPES
    // =========================================================================

    /// Consume the greedy run of identifier chars, possibly empty.
    pub(super) fn take_identifier(&mut self) -> String {
        let begin = self.pos;
        while self.peek().is_some_and(is_identifier_char) {
            self.advance(1);
        }
        self.chars[begin..self.pos].iter().collect()
    }

    /// Capture a balanced `{...}` span verbatim, braces included. Nothing
    /// inside is parsed. `start` is the escape's backslash, for errors.
    pub(super) fn scan_escaped_braces(&mut self, start: usize) -> Result<String, ParseException> {
        let open = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            self.advance(1);
            if depth == 0 {
                return Ok(self.chars[open..self.pos].iter().collect());
            }
        }
        Err(self.unterminated(start))
    }
}
