//! Tokenizer for page selection expressions
//!
//! The lexer never fails: characters it does not understand become
//! [`TokenKind::Unknown`] tokens. The parser rejects them, while the
//! composition helpers can still inspect half-typed input.

/// Kind of a lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Unsigned decimal number (saturates instead of overflowing)
    Number(u64),
    /// `-` (range separator or negative progression offset)
    Dash,
    /// `+`
    Plus,
    /// `*`
    Star,
    /// The progression variable `n`
    N,
    LParen,
    RParen,
    /// `and` or `&`
    And,
    /// `or`, `|` or `,`
    Or,
    /// `not` or `!`
    Not,
    Even,
    Odd,
    /// A word that is not a keyword
    Word(String),
    /// Any other character
    Unknown(char),
}

impl TokenKind {
    /// Logical connectives that may trail an unfinished expression
    pub fn is_logical_operator(&self) -> bool {
        matches!(self, TokenKind::And | TokenKind::Or | TokenKind::Not)
    }
}

/// A token with its byte span in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Split `source` into tokens, skipping whitespace
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_digit() {
            let mut value: u64 = 0;
            let mut end = start;
            while let Some(&(idx, digit)) = chars.peek() {
                let Some(d) = digit.to_digit(10) else { break };
                value = value.saturating_mul(10).saturating_add(u64::from(d));
                end = idx + digit.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Number(value),
                start,
                end,
            });
            continue;
        }

        if ch.is_ascii_alphabetic() {
            let mut end = start;
            while let Some(&(idx, letter)) = chars.peek() {
                if !letter.is_ascii_alphabetic() {
                    break;
                }
                end = idx + letter.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind: keyword(&source[start..end]),
                start,
                end,
            });
            continue;
        }

        chars.next();
        let kind = match ch {
            '-' => TokenKind::Dash,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '&' => TokenKind::And,
            '|' | ',' => TokenKind::Or,
            '!' => TokenKind::Not,
            other => TokenKind::Unknown(other),
        };
        tokens.push(Token {
            kind,
            start,
            end: start + ch.len_utf8(),
        });
    }

    tokens
}

fn keyword(word: &str) -> TokenKind {
    match word.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "even" => TokenKind::Even,
        "odd" => TokenKind::Odd,
        "n" => TokenKind::N,
        _ => TokenKind::Word(word.to_string()),
    }
}
