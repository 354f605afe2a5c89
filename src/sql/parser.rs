//! Recursive-descent parser over the tokenized grammar:
//!
//! ```text
//! stmt       := select | create
//! select     := SELECT field (',' field)* FROM ident (WHERE cond)?
//! field      := '*' | ident | aggregate
//! aggregate  := COUNT '(' ('*' | ident) ')'
//! cond       := ident '=' string_literal
//! create     := CREATE TABLE ident '(' coldef (',' coldef)* ')'
//! coldef     := ident type_name constraint*
//! constraint := 'PRIMARY' 'KEY' | 'NOT' 'NULL' | 'AUTOINCREMENT'
//! ```

use crate::error::{EngineError, Result};
use crate::sql::ast::*;
use crate::sql::lexer::{Lexer, PositionedToken};
use crate::sql::token::Token;

pub struct Parser {
    tokens: Vec<PositionedToken>,
    index: usize,
}

impl Parser {
    pub fn parse(input: &str) -> Result<Statement> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Parser { tokens, index: 0 };
        let stmt = match parser.peek() {
            Token::Select => Statement::Select(parser.parse_select()?),
            Token::Create => Statement::CreateTable(parser.parse_create_table()?),
            other => {
                return Err(parser.syntax_error("SELECT or CREATE", &format!("{other:?}")))
            }
        };
        parser.expect(Token::Eof)?;
        Ok(stmt)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index].token
    }

    fn position(&self) -> usize {
        self.tokens[self.index].position
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.index].token.clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<Token> {
        if *self.peek() == expected {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(&format!("{expected:?}"), &format!("{:?}", self.peek())))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.syntax_error("identifier", &format!("{other:?}"))),
        }
    }

    fn syntax_error(&self, expected: &str, found: &str) -> EngineError {
        EngineError::Syntax {
            position: self.position(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(Token::Select)?;

        let mut fields = vec![self.parse_field()?];
        while *self.peek() == Token::Comma {
            self.advance();
            fields.push(self.parse_field()?);
        }

        self.expect(Token::From)?;
        let from = self.expect_identifier()?;

        let where_clause = if *self.peek() == Token::Where {
            self.advance();
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(SelectStatement {
            fields,
            from,
            where_clause,
        })
    }

    fn parse_field(&mut self) -> Result<Field> {
        match self.peek().clone() {
            Token::Star => {
                self.advance();
                Ok(Field::Star)
            }
            Token::Count => Ok(Field::Aggregate(self.parse_aggregate()?)),
            Token::Identifier(name) => {
                self.advance();
                Ok(Field::Column(name))
            }
            other => Err(self.syntax_error("'*', identifier or COUNT", &format!("{other:?}"))),
        }
    }

    fn parse_aggregate(&mut self) -> Result<Aggregate> {
        self.expect(Token::Count)?;
        self.expect(Token::LParen)?;

        let arg = match self.peek().clone() {
            Token::Star => {
                self.advance();
                None
            }
            Token::Identifier(name) => {
                self.advance();
                Some(name)
            }
            other => Err(self.syntax_error("'*' or identifier", &format!("{other:?}")))?,
        };

        self.expect(Token::RParen)?;

        Ok(Aggregate {
            op: AggregateOp::Count,
            arg,
            display_name: "count".to_string(),
        })
    }

    fn parse_where(&mut self) -> Result<WhereClause> {
        let field = self.expect_identifier()?;
        self.expect(Token::Equals)?;

        let value = match self.peek().clone() {
            Token::StringLiteral(s) => {
                self.advance();
                Literal::Text(s)
            }
            Token::NumberLiteral(n) => {
                self.advance();
                Literal::Number(n)
            }
            other => {
                return Err(self.syntax_error("string or number literal", &format!("{other:?}")))
            }
        };

        Ok(WhereClause { field, value })
    }

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(Token::Create)?;
        self.expect(Token::Table)?;
        let table_name = self.expect_identifier()?;

        self.expect(Token::LParen)?;
        let mut columns = vec![self.parse_column_def()?];
        while *self.peek() == Token::Comma {
            self.advance();
            columns.push(self.parse_column_def()?);
        }
        self.expect(Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let type_name = self.expect_identifier()?;

        // Tolerate a parenthesized size/precision spec, e.g. varchar(16).
        // Real stored DDL commonly carries one; it's ignored, not stored.
        if *self.peek() == Token::LParen {
            self.advance();
            while *self.peek() != Token::RParen {
                self.advance();
            }
            self.advance();
        }

        let mut constraints = Vec::new();
        loop {
            match self.peek().clone() {
                Token::Primary => {
                    self.advance();
                    self.expect(Token::Key)?;
                    constraints.push(ColumnConstraint::PrimaryKey);
                }
                Token::AutoIncrement => {
                    self.advance();
                    constraints.push(ColumnConstraint::AutoIncrement);
                }
                Token::Not => {
                    self.advance();
                    self.expect(Token::Null)?;
                    constraints.push(ColumnConstraint::NotNull);
                }
                _ => break,
            }
        }

        Ok(ColumnDef {
            name,
            type_name,
            constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_select_star() {
        let stmt = Parser::parse("SELECT * FROM apples").unwrap();
        assert_eq!(
            stmt,
            Statement::Select(SelectStatement {
                fields: vec![Field::Star],
                from: "apples".to_string(),
                where_clause: None,
            })
        );
    }

    #[test]
    fn parses_projection_list_and_where() {
        let stmt = Parser::parse("SELECT name, color FROM apples WHERE color = 'Red'").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected select");
        };
        assert_eq!(
            select.fields,
            vec![Field::Column("name".into()), Field::Column("color".into())]
        );
        assert_eq!(
            select.where_clause,
            Some(WhereClause {
                field: "color".into(),
                value: Literal::Text("Red".into()),
            })
        );
    }

    #[test]
    fn parses_count_star() {
        let stmt = Parser::parse("SELECT COUNT(*) FROM apples").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected select");
        };
        assert_eq!(
            select.fields,
            vec![Field::Aggregate(Aggregate {
                op: AggregateOp::Count,
                arg: None,
                display_name: "count".into(),
            })]
        );
    }

    #[test]
    fn parses_create_table_with_constraints() {
        let stmt = Parser::parse(
            "CREATE TABLE apples (id integer PRIMARY KEY AUTOINCREMENT, name text NOT NULL)",
        )
        .unwrap();
        let Statement::CreateTable(create) = stmt else {
            panic!("expected create table");
        };
        assert_eq!(create.table_name, "apples");
        assert_eq!(create.columns.len(), 2);
        assert_eq!(create.columns[0].name, "id");
        assert!(create.columns[0]
            .constraints
            .contains(&ColumnConstraint::PrimaryKey));
        assert!(create.columns[0]
            .constraints
            .contains(&ColumnConstraint::AutoIncrement));
        assert!(create.columns[1]
            .constraints
            .contains(&ColumnConstraint::NotNull));
    }

    #[test]
    fn syntax_error_on_garbage() {
        assert!(Parser::parse("SELECT FROM FROM").is_err());
    }
}
