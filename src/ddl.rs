//! Resolves a table's stored `CREATE TABLE` text (from the schema catalog)
//! into its column order. This is the positional index every projection,
//! WHERE predicate and decoded row is aligned against.

use crate::error::{EngineError, Result};
use crate::sql::ast::{ColumnDef, Statement};
use crate::sql::parser::Parser;

/// Parses a table's stored DDL and returns its columns in declaration
/// order.
pub fn columns_of(create_table_sql: &str) -> Result<Vec<ColumnDef>> {
    match Parser::parse(create_table_sql)? {
        Statement::CreateTable(stmt) => Ok(stmt.columns),
        Statement::Select(_) => Err(EngineError::malformed(
            "schema catalog",
            "stored sql for a table was not a CREATE TABLE statement",
        )),
    }
}

/// Index of a column by name within a table's declared column list.
pub fn column_index(columns: &[ColumnDef], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_ddl() {
        let columns =
            columns_of("CREATE TABLE apples (id integer primary key, name text, color text)")
                .unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "id");
        assert_eq!(column_index(&columns, "color"), Some(2));
        assert_eq!(column_index(&columns, "missing"), None);
    }
}
