//! Tokens of the tiny SQL grammar this front-end parses.
//!
//! Grounded on the teacher's sibling-repo lexer style (hand-rolled,
//! character-at-a-time, no lexer-generator crate): keywords are matched
//! ASCII case-insensitively, identifiers and string literals keep their
//! original case.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Keywords
    Select,
    From,
    Where,
    Create,
    Table,
    Count,
    Primary,
    Key,
    Not,
    Null,
    AutoIncrement,

    // Punctuation
    LParen,
    RParen,
    Star,
    Comma,
    Equals,

    // Literals / identifiers
    Identifier(String),
    StringLiteral(String),
    NumberLiteral(i64),

    Eof,
}
