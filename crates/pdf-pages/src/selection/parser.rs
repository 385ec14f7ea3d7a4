//! Recursive-descent parser producing a [`Selection`] tree
//!
//! Precedence, highest first: `not`/`!`, `and`/`&`, `or`/`|`/`,`.
//! Binary operators associate to the left.

use super::lexer::{Token, TokenKind, tokenize};
use crate::types::ParseError;

/// Page parity keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

/// Parsed page selection. Page numbers are 1-based, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A single page number
    Page(u64),
    /// Inclusive range with `start <= end`
    Range { start: u64, end: u64 },
    /// Every page `every * n + offset` for `n = 0, 1, 2, ...`
    Step { every: u64, offset: i64 },
    Parity(Parity),
    Not(Box<Selection>),
    And(Box<Selection>, Box<Selection>),
    Or(Box<Selection>, Box<Selection>),
}

/// Parse a selection expression into a tree.
///
/// Empty input is an error here; [`super::resolve`] treats it as "all pages"
/// before calling the parser.
pub fn parse(source: &str) -> Result<Selection, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser {
        source,
        tokens: &tokens,
        pos: 0,
    };
    let selection = parser.parse_disjunction()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error_at(token, "unexpected input"));
    }
    Ok(selection)
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_kind_at(&self, ahead: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: &str) -> ParseError {
        ParseError::new(self.source, token.start, message)
    }

    fn error_here(&self, message: &str) -> ParseError {
        match self.peek() {
            Some(token) => self.error_at(token, message),
            None => ParseError::new(self.source, self.source.len(), message),
        }
    }

    fn parse_disjunction(&mut self) -> Result<Selection, ParseError> {
        let mut left = self.parse_conjunction()?;
        while self.peek_kind() == Some(&TokenKind::Or) {
            self.advance();
            let right = self.parse_conjunction()?;
            left = Selection::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_conjunction(&mut self) -> Result<Selection, ParseError> {
        let mut left = self.parse_unary()?;
        while self.peek_kind() == Some(&TokenKind::And) {
            self.advance();
            let right = self.parse_unary()?;
            left = Selection::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Selection, ParseError> {
        if self.peek_kind() == Some(&TokenKind::Not) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Selection::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Selection, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here("expected a page, range or keyword"));
        };

        match &token.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_disjunction()?;
                if self.peek_kind() != Some(&TokenKind::RParen) {
                    return Err(self.error_here("expected ')'"));
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Even => {
                self.advance();
                Ok(Selection::Parity(Parity::Even))
            }
            TokenKind::Odd => {
                self.advance();
                Ok(Selection::Parity(Parity::Odd))
            }
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                self.parse_after_number(value)
            }
            _ => Err(self.error_at(token, "expected a page, range or keyword")),
        }
    }

    /// Continue after a leading number: range, progression or single page
    fn parse_after_number(&mut self, value: u64) -> Result<Selection, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Dash) => {
                self.advance();
                let end = self.expect_number("expected a number after '-'")?;
                let (start, end) = if value <= end {
                    (value, end)
                } else {
                    (end, value)
                };
                Ok(Selection::Range { start, end })
            }
            Some(TokenKind::Star) if self.peek_kind_at(1) == Some(&TokenKind::N) => {
                self.advance();
                self.advance();
                self.parse_progression(value)
            }
            Some(TokenKind::Star) => {
                self.advance();
                Err(self.error_here("expected 'n' after '*'"))
            }
            Some(TokenKind::N) => {
                self.advance();
                self.parse_progression(value)
            }
            _ => Ok(Selection::Page(value)),
        }
    }

    fn parse_progression(&mut self, every: u64) -> Result<Selection, ParseError> {
        let negative = match self.peek_kind() {
            Some(TokenKind::Plus) => false,
            Some(TokenKind::Dash) => true,
            _ => return Ok(Selection::Step { every, offset: 0 }),
        };
        self.advance();
        let magnitude = self.expect_number("expected a number after the progression sign")?;
        let magnitude = i64::try_from(magnitude).unwrap_or(i64::MAX);
        let offset = if negative { -magnitude } else { magnitude };
        Ok(Selection::Step { every, offset })
    }

    fn expect_number(&mut self, message: &str) -> Result<u64, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Number(value)) => {
                let value = *value;
                self.advance();
                Ok(value)
            }
            _ => Err(self.error_here(message)),
        }
    }
}
