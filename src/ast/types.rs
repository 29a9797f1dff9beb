//! Expression Tree Types
//!
//! This module defines the tree produced by the parser. A template is an
//! `Expression`: an ordered list of literal text runs and expansions. Default
//! values and required-messages are themselves `Expression`s, so the tree nests
//! as deeply as the input does.
//!
//! Nothing here resolves variables. A consumer walks the tree and decides what
//! each expansion means against its own environment.

use serde::Serialize;
use std::fmt;

// =============================================================================
// EXPRESSION
// =============================================================================

/// Root node: a parsed template, rendered by concatenating its items in order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Expression(Vec<ExpressionItem>);

impl Expression {
    pub fn new(items: Vec<ExpressionItem>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[ExpressionItem] {
        &self.0
    }

    pub fn into_items(self) -> Vec<ExpressionItem> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExpressionItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identifiers referenced by every expansion in the tree, depth-first and
    /// in document order. Escaped dollars reference nothing and are skipped.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        for item in &self.0 {
            let ExpressionItem::Expansion(expansion) = item else {
                continue;
            };
            match expansion {
                Expansion::Escaped(_) => {}
                Expansion::Variable(v) => out.push(&v.identifier),
                Expansion::Substring(s) => out.push(&s.identifier),
                Expansion::EmptyValue(e) => {
                    out.push(&e.identifier);
                    e.content.collect_variables(out);
                }
                Expansion::UnsetValue(u) => {
                    out.push(&u.identifier);
                    u.content.collect_variables(out);
                }
                Expansion::Required(r) => {
                    out.push(&r.identifier);
                    r.message.collect_variables(out);
                }
            }
        }
    }
}

impl From<Vec<ExpressionItem>> for Expression {
    fn from(items: Vec<ExpressionItem>) -> Self {
        Self(items)
    }
}

impl FromIterator<ExpressionItem> for Expression {
    fn from_iter<I: IntoIterator<Item = ExpressionItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Expression {
    type Item = ExpressionItem;
    type IntoIter = std::vec::IntoIter<ExpressionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Expression {
    type Item = &'a ExpressionItem;
    type IntoIter = std::slice::Iter<'a, ExpressionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One piece of an expression: literal text or an expansion, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExpressionItem {
    Text(String),
    Expansion(Expansion),
}

// =============================================================================
// EXPANSIONS
// =============================================================================

/// Union of all expansion kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expansion {
    Variable(VariableExpansion),
    EmptyValue(EmptyValueExpansion),
    UnsetValue(UnsetValueExpansion),
    Substring(SubstringExpansion),
    Required(RequiredExpansion),
    Escaped(EscapedExpansion),
}

impl Expansion {
    /// The referenced variable, or the raw text after an escaped dollar
    pub fn identifier(&self) -> &str {
        match self {
            Self::Variable(v) => &v.identifier,
            Self::EmptyValue(e) => &e.identifier,
            Self::UnsetValue(u) => &u.identifier,
            Self::Substring(s) => &s.identifier,
            Self::Required(r) => &r.identifier,
            Self::Escaped(e) => &e.identifier,
        }
    }
}

/// $VAR or ${VAR}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableExpansion {
    pub identifier: String,
}

/// ${VAR:-default}: default applies when VAR is unset or empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyValueExpansion {
    pub identifier: String,
    pub content: Expression,
}

/// ${VAR-default}: default applies only when VAR is unset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsetValueExpansion {
    pub identifier: String,
    pub content: Expression,
}

/// ${VAR:offset} or ${VAR:offset:length}
///
/// A negative offset counts from the end of the value. `length` is only
/// meaningful when `has_length` is set and is zero otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstringExpansion {
    pub identifier: String,
    pub offset: i64,
    pub length: i64,
    pub has_length: bool,
}

/// ${VAR?message}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredExpansion {
    pub identifier: String,
    pub message: Expression,
}

/// $$NAME or \$NAME or \${...}: a literal dollar sign
///
/// `identifier` holds the raw, unparsed text captured after the dollar. For the
/// braced form this includes both braces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscapedExpansion {
    pub identifier: String,
}

// =============================================================================
// RENDERING
// =============================================================================

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.0 {
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

impl fmt::Display for ExpressionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Expansion(expansion) => write!(f, "{}", expansion),
        }
    }
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => write!(f, "{}", v),
            Self::EmptyValue(e) => write!(f, "{}", e),
            Self::UnsetValue(u) => write!(f, "{}", u),
            Self::Substring(s) => write!(f, "{}", s),
            Self::Required(r) => write!(f, "{}", r),
            Self::Escaped(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for VariableExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}}}", self.identifier)
    }
}

impl fmt::Display for EmptyValueExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}:-{}}}", self.identifier, self.content)
    }
}

impl fmt::Display for UnsetValueExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}-{}}}", self.identifier, self.content)
    }
}

impl fmt::Display for SubstringExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ":-" would read back as a default value
        let sep = if self.offset < 0 { ": " } else { ":" };
        write!(f, "${{{}{}{}", self.identifier, sep, self.offset)?;
        if self.has_length {
            write!(f, ":{}", self.length)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for RequiredExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}?{}}}", self.identifier, self.message)
    }
}

impl fmt::Display for EscapedExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\${}", self.identifier)
    }
}

// =============================================================================
// AST FACTORY (helper functions)
// =============================================================================

pub struct AST;

impl AST {
    pub fn expression(items: Vec<ExpressionItem>) -> Expression {
        Expression(items)
    }

    pub fn text(value: impl Into<String>) -> ExpressionItem {
        ExpressionItem::Text(value.into())
    }

    pub fn variable(identifier: impl Into<String>) -> ExpressionItem {
        ExpressionItem::Expansion(Expansion::Variable(VariableExpansion {
            identifier: identifier.into(),
        }))
    }

    pub fn empty_value(identifier: impl Into<String>, content: Vec<ExpressionItem>) -> ExpressionItem {
        ExpressionItem::Expansion(Expansion::EmptyValue(EmptyValueExpansion {
            identifier: identifier.into(),
            content: Expression(content),
        }))
    }

    pub fn unset_value(identifier: impl Into<String>, content: Vec<ExpressionItem>) -> ExpressionItem {
        ExpressionItem::Expansion(Expansion::UnsetValue(UnsetValueExpansion {
            identifier: identifier.into(),
            content: Expression(content),
        }))
    }

    pub fn substring(identifier: impl Into<String>, offset: i64, length: Option<i64>) -> ExpressionItem {
        ExpressionItem::Expansion(Expansion::Substring(SubstringExpansion {
            identifier: identifier.into(),
            offset,
            length: length.unwrap_or(0),
            has_length: length.is_some(),
        }))
    }

    pub fn required(identifier: impl Into<String>, message: Vec<ExpressionItem>) -> ExpressionItem {
        ExpressionItem::Expansion(Expansion::Required(RequiredExpansion {
            identifier: identifier.into(),
            message: Expression(message),
        }))
    }

    pub fn escaped(identifier: impl Into<String>) -> ExpressionItem {
        ExpressionItem::Expansion(Expansion::Escaped(EscapedExpansion {
            identifier: identifier.into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_and_defaults() {
        let expr = AST::expression(vec![
            AST::text("Hello "),
            AST::variable("NAME"),
            AST::text(", "),
            AST::empty_value("GREETING", vec![AST::text("hi "), AST::variable("WHO")]),
            AST::unset_value("X", vec![AST::text("y")]),
        ]);
        assert_eq!(expr.to_string(), "Hello ${NAME}, ${GREETING:-hi ${WHO}}${X-y}");
    }

    #[test]
    fn test_render_substring() {
        assert_eq!(AST::substring("V", 1, None).to_string(), "${V:1}");
        assert_eq!(AST::substring("V", 1, Some(-7)).to_string(), "${V:1:-7}");
        assert_eq!(AST::substring("V", -1, None).to_string(), "${V: -1}");
    }

    #[test]
    fn test_render_required_and_escaped() {
        assert_eq!(
            AST::required("V", vec![AST::text("Required")]).to_string(),
            "${V?Required}"
        );
        assert_eq!(AST::escaped("MOUNTAIN").to_string(), "\\$MOUNTAIN");
        assert_eq!(AST::escaped("{A-b}").to_string(), "\\${A-b}");
        assert_eq!(AST::escaped("").to_string(), "\\$");
    }

    #[test]
    fn test_substring_without_length_is_zeroed() {
        let ExpressionItem::Expansion(Expansion::Substring(s)) = AST::substring("V", 3, None) else {
            panic!("expected substring");
        };
        assert_eq!(s.offset, 3);
        assert_eq!(s.length, 0);
        assert!(!s.has_length);
    }

    #[test]
    fn test_identifier_accessor() {
        let ExpressionItem::Expansion(e) = AST::required("NEEDED", vec![]) else {
            panic!("expected expansion");
        };
        assert_eq!(e.identifier(), "NEEDED");
    }

    #[test]
    fn test_variables_depth_first() {
        let expr = AST::expression(vec![
            AST::empty_value(
                "A",
                vec![AST::unset_value("B", vec![AST::variable("C")]), AST::escaped("D")],
            ),
            AST::text("x"),
            AST::required("E", vec![AST::variable("A")]),
            AST::substring("F", 0, Some(1)),
        ]);
        assert_eq!(expr.variables(), vec!["A", "B", "C", "E", "A", "F"]);
    }

    #[test]
    fn test_collect_and_iterate() {
        let expr: Expression = vec![AST::text("a"), AST::variable("B")].into_iter().collect();
        assert_eq!(expr.len(), 2);
        assert!(!expr.is_empty());
        let texts: Vec<_> = expr
            .iter()
            .filter_map(|item| match item {
                ExpressionItem::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["a"]);
        assert_eq!(expr.into_items().len(), 2);
    }

    #[test]
    fn test_serialize_json() {
        let expr = AST::expression(vec![AST::text("a"), AST::substring("V", -2, Some(1))]);
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"Text": "a"},
                {"Expansion": {"Substring": {
                    "identifier": "V", "offset": -2, "length": 1, "has_length": true
                }}}
            ])
        );
    }
}
