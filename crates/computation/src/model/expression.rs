//! Additive arithmetic expressions.
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := NUMBER | VARIABLE
//! NUMBER     := [0-9]+ ('.' [0-9]+)?
//! VARIABLE   := [A-Za-z_] [A-Za-z0-9_]*
//! ```
//!
//! Whitespace between tokens is ignored. There is no multiplication,
//! division or grouping.

use std::fmt;

use tracing::debug;

use crate::error::ExpressionError;
use crate::model::Decimal;

/// An unparsed expression string.
///
/// Parsing happens on every call to [`Expression::parse`], [`Expression::evaluate`]
/// or [`Expression::variables`]; nothing is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Expression(String);

impl Expression {
    /// Wraps an expression string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the expression text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the expression text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the expression.
    pub fn parse(&self) -> Result<ParsedExpression, ExpressionError> {
        if self.0.is_empty() {
            return Err(ExpressionError::Empty);
        }
        Parser::new(&self.0).parse()
    }

    /// Evaluates the expression, resolving variables through `resolver`.
    ///
    /// Returns `None` for an empty expression, a malformed one, any
    /// variable the resolver cannot resolve, or arithmetic overflow.
    pub fn evaluate<F>(&self, resolver: F) -> Option<Decimal>
    where
        F: Fn(&str) -> Option<Decimal>,
    {
        if self.0.is_empty() {
            return None;
        }
        match self.parse().and_then(|parsed| parsed.evaluate(&resolver)) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(expression = %self.0, error = %e, "expression is not computable");
                None
            }
        }
    }

    /// Variable names in order of appearance, duplicates included.
    ///
    /// Empty or malformed expressions have no variables.
    pub fn variables(&self) -> Vec<String> {
        match self.parse() {
            Ok(parsed) => parsed.variables().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Expression {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary operator between two terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
}

/// A literal or a variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Number(Decimal),
    Variable(String),
}

/// A parsed expression: a sequence of signed terms.
///
/// The first term always carries [`Operator::Add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExpression {
    terms: Vec<(Operator, Term)>,
}

impl ParsedExpression {
    /// The signed terms, left to right.
    pub fn terms(&self) -> &[(Operator, Term)] {
        &self.terms
    }

    /// Folds the terms left to right starting from zero.
    pub fn evaluate<F>(&self, resolver: &F) -> Result<Decimal, ExpressionError>
    where
        F: Fn(&str) -> Option<Decimal>,
    {
        self.terms
            .iter()
            .try_fold(Decimal::ZERO, |acc, (op, term)| {
                let value = match term {
                    Term::Number(n) => *n,
                    Term::Variable(name) => {
                        resolver(name).ok_or_else(|| ExpressionError::UnresolvedVariable {
                            name: name.clone(),
                        })?
                    }
                };
                match op {
                    Operator::Add => acc.checked_add(value),
                    Operator::Subtract => acc.checked_sub(value),
                }
                .ok_or(ExpressionError::Overflow)
            })
    }

    /// Variable names in order of appearance.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(|(_, term)| match term {
            Term::Variable(name) => Some(name.as_str()),
            Term::Number(_) => None,
        })
    }
}

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Number,
    Variable,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    position: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek_byte().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, ExpressionError> {
        self.take_while(|b| b.is_ascii_whitespace());
        let start = self.pos;
        let Some(b) = self.peek_byte() else {
            return Ok(None);
        };

        let kind = match b {
            b'+' => {
                self.pos += 1;
                TokenKind::Plus
            }
            b'-' => {
                self.pos += 1;
                TokenKind::Minus
            }
            b'0'..=b'9' => {
                self.take_while(|b| b.is_ascii_digit());
                let bytes = self.input.as_bytes();
                if bytes.get(self.pos) == Some(&b'.')
                    && bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit)
                {
                    self.pos += 1;
                    self.take_while(|b| b.is_ascii_digit());
                }
                TokenKind::Number
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                TokenKind::Variable
            }
            _ => {
                // Input is a str, so `start` is a char boundary.
                let found = self.input[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(ExpressionError::UnexpectedCharacter {
                    position: start,
                    found,
                });
            }
        };

        Ok(Some(Token {
            kind,
            text: &self.input[start..self.pos],
            position: start,
        }))
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    fn parse(mut self) -> Result<ParsedExpression, ExpressionError> {
        let mut terms = vec![(Operator::Add, self.term()?)];
        while let Some(token) = self.lexer.next_token()? {
            let op = match token.kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Subtract,
                _ => return Err(unexpected(token, "operator")),
            };
            terms.push((op, self.term()?));
        }
        Ok(ParsedExpression { terms })
    }

    fn term(&mut self) -> Result<Term, ExpressionError> {
        let token = self
            .lexer
            .next_token()?
            .ok_or(ExpressionError::UnexpectedEnd { expected: "term" })?;
        match token.kind {
            TokenKind::Number => token
                .text
                .parse()
                .map(Term::Number)
                .map_err(|source| ExpressionError::InvalidNumber {
                    literal: token.text.to_string(),
                    source,
                }),
            TokenKind::Variable => Ok(Term::Variable(token.text.to_string())),
            _ => Err(unexpected(token, "term")),
        }
    }
}

fn unexpected(token: Token<'_>, expected: &'static str) -> ExpressionError {
    ExpressionError::UnexpectedToken {
        position: token.position,
        expected,
        found: token.text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn no_variables(_: &str) -> Option<Decimal> {
        None
    }

    fn eval(expression: &str) -> Option<Decimal> {
        Expression::from(expression).evaluate(no_variables)
    }

    #[test]
    fn test_empty_is_absent() {
        assert_eq!(eval(""), None);
        assert_eq!(Expression::default().evaluate(no_variables), None);
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("2"), Some(dec("2")));
        assert_eq!(eval("2 - 4"), Some(dec("-2")));
        assert_eq!(eval("2 + 4 - 5"), Some(dec("1")));
        assert_eq!(eval("  1.5+2.25 "), Some(dec("3.75")));
        assert_eq!(eval("0.1 + 0.2"), Some(dec("0.3")));
    }

    #[test]
    fn test_zero_is_distinct_from_absent() {
        assert_eq!(eval("2 - 2"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_variables_resolve() {
        let resolver = |name: &str| match name {
            "var1" => Some(dec("2")),
            "var2" => Some(dec("3")),
            _ => None,
        };
        assert_eq!(Expression::from("var1").evaluate(resolver), Some(dec("2")));
        assert_eq!(
            Expression::from("var1 + var2 - 4").evaluate(resolver),
            Some(dec("1"))
        );
    }

    #[test]
    fn test_unresolved_variable_is_absent() {
        let resolver = |name: &str| (name == "var1").then(|| dec("2"));
        assert_eq!(Expression::from("var1 + var2 - 4").evaluate(resolver), None);
        assert!(matches!(
            Expression::from("var2").parse().unwrap().evaluate(&resolver),
            Err(ExpressionError::UnresolvedVariable { name }) if name == "var2"
        ));
    }

    #[test]
    fn test_malformed_is_absent() {
        for text in ["+", "2 +", "2 3", "2 + + 3", "2 * 3", "(2)", "2.", ".5", "-2", "a b", "   "] {
            assert_eq!(eval(text), None, "{text:?}");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Expression::from("").parse(), Err(ExpressionError::Empty));
        assert_eq!(
            Expression::from("2 +").parse(),
            Err(ExpressionError::UnexpectedEnd { expected: "term" })
        );
        assert_eq!(
            Expression::from("2 * 3").parse(),
            Err(ExpressionError::UnexpectedCharacter {
                position: 2,
                found: '*'
            })
        );
        assert_eq!(
            Expression::from("2 x").parse(),
            Err(ExpressionError::UnexpectedToken {
                position: 2,
                expected: "operator",
                found: "x".to_string()
            })
        );
    }

    #[test]
    fn test_variables() {
        assert_eq!(
            Expression::from("var1 + var2 - 4").variables(),
            vec!["var1", "var2"]
        );
        assert_eq!(Expression::from("a + a - _b2").variables(), vec!["a", "a", "_b2"]);
        assert!(Expression::from("2 - 4").variables().is_empty());
        assert!(Expression::from("").variables().is_empty());
        assert!(Expression::from("a +").variables().is_empty());
    }

    #[test]
    fn test_parsing_is_repeatable() {
        let expression = Expression::from("x - 1");
        assert_eq!(expression.parse(), expression.parse());
        let resolver = |_: &str| Some(dec("10"));
        assert_eq!(expression.evaluate(resolver), expression.evaluate(resolver));
    }

    #[test]
    fn test_overflow_is_absent() {
        let big = "9".repeat(38);
        assert!(eval(&big).is_some());
        assert_eq!(eval(&format!("{big} + {big} + {big} + {big} + {big}")), None);
    }
}
