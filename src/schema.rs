//! Schema catalog: decodes page 1 (the schema table) into `TableSchema`
//! records and resolves table names to root pages and stored DDL.
//!
//! Grounded on the teacher's `database.rs::get_master_table`, generalized
//! from a single `Database` method into a standalone catalog the rest of
//! the engine depends on.

use crate::btree::scan_table;
use crate::error::{EngineError, Result};
use crate::reader::Reader;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub obj_type: String,
    pub name: String,
    pub table_name: String,
    pub root_page: i64,
    pub sql: String,
}

/// The schema table (page 1) is itself a table B-tree with 5 text/integer
/// columns in this fixed order.
fn row_to_schema(values: &[Value]) -> Result<TableSchema> {
    if values.len() != 5 {
        return Err(EngineError::malformed(
            "schema table",
            format!("expected 5 columns, found {}", values.len()),
        ));
    }

    let text = |i: usize, field: &str| -> Result<String> {
        match &values[i] {
            Value::Text(s) => Ok(s.clone()),
            other => Err(EngineError::TypeMismatch {
                column: field.to_string(),
                expected: "TEXT".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    };

    let root_page = values[3]
        .as_i64()
        .ok_or_else(|| EngineError::TypeMismatch {
            column: "rootpage".to_string(),
            expected: "INTEGER".to_string(),
            found: values[3].type_name().to_string(),
        })?;

    Ok(TableSchema {
        obj_type: text(0, "type")?,
        name: text(1, "name")?,
        table_name: text(2, "tbl_name")?,
        root_page,
        sql: text(4, "sql")?,
    })
}

/// Decodes every record on the schema page (page 1), in on-disk cell
/// order (rowid-ascending, i.e. historical insertion order).
pub fn load_schemas(reader: &mut Reader) -> Result<Vec<TableSchema>> {
    let rows = scan_table(reader, 1)?;
    rows.iter().map(|row| row_to_schema(&row.values)).collect()
}

/// Resolves a table name to its schema entry. Linear scan, matching the
/// teacher's `get_table`/`get_index` (the schema table is rarely large
/// enough to warrant an index of its own).
pub fn find_table(reader: &mut Reader, table_name: &str) -> Result<TableSchema> {
    load_schemas(reader)?
        .into_iter()
        .find(|s| s.obj_type == "table" && s.table_name == table_name)
        .ok_or_else(|| EngineError::NotFound {
            table: table_name.to_string(),
        })
}
