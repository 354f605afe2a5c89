//! Result formatter: pipe-delimited row printing, one row per line, no
//! header row.

use std::fmt::Write as _;

use crate::error::{EngineError, Result};
use crate::sql::executor::OutputRow;
use crate::value::Value;

fn format_value(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Int(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok((*b as i64).to_string()),
        Value::Text(s) => Ok(s.clone()),
        Value::Blob(_) => Err(EngineError::unsupported(
            "formatting a BLOB column as query output",
        )),
    }
}

/// Renders one row as `|`-joined column values.
pub fn format_row(row: &OutputRow) -> Result<String> {
    let mut out = String::new();
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            out.push('|');
        }
        write!(out, "{}", format_value(value)?).unwrap();
    }
    Ok(out)
}

/// Writes every row to `out`, one per line.
pub fn print_rows(rows: &[OutputRow]) -> Result<()> {
    for row in rows {
        println!("{}", format_row(row)?);
    }
    Ok(())
}
