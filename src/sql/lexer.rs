//! Hand-rolled tokenizer, in the teacher's-sibling-repo style: a
//! character-at-a-time scanner over the input string, no lexer-generator
//! crate. Keyword matching is ASCII case-insensitive; identifiers and
//! string literals preserve case.

use crate::error::{EngineError, Result};
use crate::sql::token::Token;

/// A token paired with the byte offset it started at, for `Syntax` error
/// diagnostics.
#[derive(Debug, Clone)]
pub struct PositionedToken {
    pub token: Token,
    pub position: usize,
}

pub struct Lexer<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.as_bytes(),
            position: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.token == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.position += 1;
        }
    }

    fn next_token(&mut self) -> Result<PositionedToken> {
        self.skip_whitespace();
        let start = self.position;

        let Some(byte) = self.peek() else {
            return Ok(PositionedToken {
                token: Token::Eof,
                position: start,
            });
        };

        let token = match byte {
            b'(' => {
                self.position += 1;
                Token::LParen
            }
            b')' => {
                self.position += 1;
                Token::RParen
            }
            b'*' => {
                self.position += 1;
                Token::Star
            }
            b',' => {
                self.position += 1;
                Token::Comma
            }
            b'=' => {
                self.position += 1;
                Token::Equals
            }
            b'\'' => self.read_string_literal()?,
            b'0'..=b'9' => self.read_number(),
            b if b.is_ascii_alphabetic() || b == b'_' => self.read_identifier_or_keyword(),
            other => {
                return Err(EngineError::Syntax {
                    position: start,
                    expected: "a token".to_string(),
                    found: format!("byte 0x{other:02x}"),
                })
            }
        };

        Ok(PositionedToken {
            token,
            position: start,
        })
    }

    fn read_string_literal(&mut self) -> Result<Token> {
        let start = self.position;
        self.position += 1; // opening quote
        let content_start = self.position;
        while matches!(self.peek(), Some(b) if b != b'\'') {
            self.position += 1;
        }
        if self.peek().is_none() {
            return Err(EngineError::Syntax {
                position: start,
                expected: "closing '".to_string(),
                found: "end of input".to_string(),
            });
        }
        let content = std::str::from_utf8(&self.input[content_start..self.position])
            .unwrap()
            .to_string();
        self.position += 1; // closing quote
        Ok(Token::StringLiteral(content))
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.position += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.position]).unwrap();
        Token::NumberLiteral(text.parse().unwrap_or(0))
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.position;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.position += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.position]).unwrap();
        match text.to_ascii_uppercase().as_str() {
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "COUNT" => Token::Count,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "NOT" => Token::Not,
            "NULL" => Token::Null,
            "AUTOINCREMENT" => Token::AutoIncrement,
            _ => Token::Identifier(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|p| p.token)
            .collect()
    }

    #[test]
    fn tokenizes_simple_select() {
        let tokens = tokens_of("SELECT name FROM apples WHERE color = 'Red'");
        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Identifier("name".into()),
                Token::From,
                Token::Identifier("apples".into()),
                Token::Where,
                Token::Identifier("color".into()),
                Token::Equals,
                Token::StringLiteral("Red".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        let tokens = tokens_of("select * from Apples");
        assert_eq!(tokens[0], Token::Select);
        assert_eq!(tokens[1], Token::Star);
        assert_eq!(tokens[2], Token::From);
        assert_eq!(tokens[3], Token::Identifier("Apples".into()));
    }

    #[test]
    fn count_star_call() {
        let tokens = tokens_of("SELECT COUNT(*) FROM apples");
        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Count,
                Token::LParen,
                Token::Star,
                Token::RParen,
                Token::From,
                Token::Identifier("apples".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_syntax_error() {
        assert!(Lexer::new("SELECT * FROM t WHERE x = 'abc").tokenize().is_err());
    }
}
