//! Text helpers for building selection expressions incrementally
//!
//! These never validate the resulting expression. They only keep the
//! connectives between terms well-formed so the resolver is not handed
//! phrases like `3-5 and or 7`.

use super::lexer::{TokenKind, tokenize};

/// Operator or parity keyword inserted by [`insert_operator_smart`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOperator {
    And,
    Or,
    Not,
    Even,
    Odd,
}

impl SelectionOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            SelectionOperator::And => "and",
            SelectionOperator::Or => "or",
            SelectionOperator::Not => "not",
            SelectionOperator::Even => "even",
            SelectionOperator::Odd => "odd",
        }
    }
}

/// Append `expr` to the current input.
///
/// Joins with `" or "` unless the input already ends in a logical operator
/// or an open parenthesis.
pub fn append_expression(current: &str, expr: &str) -> String {
    if current.trim().is_empty() {
        return expr.to_string();
    }
    if ends_awaiting_term(current) {
        if current.ends_with(char::is_whitespace) {
            format!("{current}{expr}")
        } else {
            format!("{current} {expr}")
        }
    } else {
        format!("{} or {expr}", current.trim_end())
    }
}

/// Insert an operator or parity keyword, normalizing trailing connectives.
///
/// The result always ends with a single space.
pub fn insert_operator_smart(current: &str, op: SelectionOperator) -> String {
    match op {
        SelectionOperator::Even | SelectionOperator::Odd => insert_term(current, op.keyword()),
        SelectionOperator::And | SelectionOperator::Or | SelectionOperator::Not => {
            insert_connective(current, op)
        }
    }
}

fn insert_term(current: &str, word: &str) -> String {
    let base = current.trim_end();
    if base.is_empty() {
        format!("{word} ")
    } else if ends_awaiting_term(base) {
        format!("{base} {word} ")
    } else {
        format!("{base} or {word} ")
    }
}

fn insert_connective(current: &str, op: SelectionOperator) -> String {
    let tokens = tokenize(current);
    let trailing = tokens
        .iter()
        .rev()
        .take(2)
        .take_while(|t| t.kind.is_logical_operator())
        .count();
    let inspected = &tokens[tokens.len() - trailing..];
    let kinds: Vec<&TokenKind> = inspected.iter().map(|t| &t.kind).collect();

    let phrase = match op {
        SelectionOperator::Not => match kinds.as_slice() {
            [TokenKind::And] | [TokenKind::And, TokenKind::Not] => "and not",
            [TokenKind::Or] | [TokenKind::Or, TokenKind::Not] => "or not",
            _ => "not",
        },
        _ => op.keyword(),
    };

    let base = match inspected.first() {
        Some(first) => &current[..first.start],
        None => current,
    }
    .trim_end();

    if base.is_empty() {
        format!("{phrase} ")
    } else {
        format!("{base} {phrase} ")
    }
}

/// True when the next term needs no connective in front of it
fn ends_awaiting_term(text: &str) -> bool {
    tokenize(text)
        .last()
        .is_some_and(|t| t.kind.is_logical_operator() || t.kind == TokenKind::LParen)
}

/// `1-n`, clamped to the document
pub fn first_n_expression(n: i64, max_pages: usize) -> Option<String> {
    if n <= 0 || max_pages == 0 {
        return None;
    }
    let end = (n as u64).min(max_pages as u64);
    Some(format!("1-{end}"))
}

/// The last `n` pages as a range, clamped to the document
pub fn last_n_expression(n: i64, max_pages: usize) -> Option<String> {
    if n <= 0 || max_pages == 0 {
        return None;
    }
    let max = max_pages as u64;
    let start = max - (n as u64).min(max) + 1;
    Some(format!("{start}-{max}"))
}

pub fn every_nth_expression(n: i64) -> Option<String> {
    if n <= 0 {
        return None;
    }
    Some(format!("{n}n"))
}

/// Inclusive range; reversed bounds are swapped and the end is clamped
pub fn range_expression(start: i64, end: i64, max_pages: usize) -> Option<String> {
    if start <= 0 || end <= 0 || max_pages == 0 {
        return None;
    }
    let (low, high) = if start <= end {
        (start as u64, end as u64)
    } else {
        (end as u64, start as u64)
    };
    let max = max_pages as u64;
    if low > max {
        return None;
    }
    Some(format!("{low}-{}", high.min(max)))
}
