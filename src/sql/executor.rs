//! Drives the schema catalog and B-tree walker to execute an
//! `ExecutionPlan`.
//!
//! Grounded on the original implementation's `Executor.execute` /
//! `getRawData` (`original_source/app/execute.go`): the `len(columns) > 0`
//! branch there is this crate's general path. The `aggFunc` branch with the
//! `item.arg == "*"` special case, which reads the B-tree header's cell
//! counts without decoding records, is the `COUNT(*)` fast path kept here.
//! The original only ever compares WHERE operands against `[]byte` (TEXT).
//! This crate also compares against `Value::Int`/`Value::Bool` columns for
//! numeric equality.

use crate::ddl::{column_index, columns_of};
use crate::error::{EngineError, Result};
use crate::reader::Reader;
use crate::schema::find_table;
use crate::sql::ast::{AggregateOp, Literal};
use crate::sql::planner::ExecutionPlan;
use crate::value::Value;
use crate::{btree, sql};

/// One output row: its values in projection order. Column names are not
/// carried through, the result stream has no header row.
pub type OutputRow = Vec<Value>;

pub fn execute(reader: &mut Reader, plan: &ExecutionPlan) -> Result<Vec<OutputRow>> {
    let schema = find_table(reader, &plan.table)?;
    let columns = columns_of(&schema.sql)?;

    if let Some(aggregate) = plan.aggregates.first() {
        if plan.aggregates.len() > 1 {
            return Err(EngineError::unsupported("more than one aggregate per SELECT"));
        }
        if aggregate.op != AggregateOp::Count || aggregate.arg.is_some() {
            return Err(EngineError::unsupported(
                "aggregates other than a lone COUNT(*)",
            ));
        }

        if plan.predicate.is_none() {
            // Fast path: sum cell_count across leaf pages, never decoding
            // a single record.
            let count = btree::count_rows(reader, schema.root_page as u32)?;
            return Ok(vec![vec![Value::Int(count as i64)]]);
        }

        let rows = btree::scan_table(reader, schema.root_page as u32)?;
        let mut count = 0i64;
        for row in &rows {
            if predicate_matches(plan, &columns, &row.values)? {
                count += 1;
            }
        }
        return Ok(vec![vec![Value::Int(count)]]);
    }

    // General path: decode every row, apply the predicate, then project
    // the requested columns.
    let projection_indices: Vec<usize> = if plan.select_star {
        (0..columns.len()).collect()
    } else {
        plan.projections
            .iter()
            .map(|name| {
                column_index(&columns, name).ok_or_else(|| {
                    EngineError::malformed(
                        "query planning",
                        format!("column {name} not found in table {}", plan.table),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    let rows = btree::scan_table(reader, schema.root_page as u32)?;
    let mut output = Vec::with_capacity(rows.len());
    for row in &rows {
        if !predicate_matches(plan, &columns, &row.values)? {
            continue;
        }

        if row.values.len() < columns.len() {
            return Err(EngineError::malformed(
                "row decode",
                format!(
                    "row {} has {} values, expected {} per CREATE TABLE",
                    row.rowid,
                    row.values.len(),
                    columns.len()
                ),
            ));
        }

        let projected = projection_indices
            .iter()
            .map(|&i| row.values[i].clone())
            .collect();
        output.push(projected);
    }

    Ok(output)
}

fn predicate_matches(
    plan: &ExecutionPlan,
    columns: &[crate::sql::ast::ColumnDef],
    values: &[Value],
) -> Result<bool> {
    let Some(predicate) = &plan.predicate else {
        return Ok(true);
    };

    let idx = column_index(columns, &predicate.column).ok_or_else(|| {
        EngineError::malformed(
            "query planning",
            format!("WHERE column {} not found", predicate.column),
        )
    })?;

    let value = values.get(idx).unwrap_or(&Value::Null);

    Ok(match (&predicate.literal, value) {
        (Literal::Text(lit), Value::Text(col)) => lit == col,
        (Literal::Number(lit), Value::Int(col)) => lit == col,
        (Literal::Number(lit), Value::Bool(col)) => *lit == *col as i64,
        (_, Value::Null) => false,
        (Literal::Text(_), other) => {
            return Err(EngineError::TypeMismatch {
                column: predicate.column.clone(),
                expected: "TEXT".to_string(),
                found: other.type_name().to_string(),
            })
        }
        (Literal::Number(_), other) => {
            return Err(EngineError::TypeMismatch {
                column: predicate.column.clone(),
                expected: "INTEGER".to_string(),
                found: other.type_name().to_string(),
            })
        }
    })
}

/// Parses, plans and executes a full SQL statement in one call. The entry
/// point `main` drives this for any command that isn't a `.`-prefixed
/// meta-command.
pub fn run_query(reader: &mut Reader, sql_text: &str) -> Result<Vec<OutputRow>> {
    let statement = sql::parser::Parser::parse(sql_text)?;
    let select = match statement {
        sql::ast::Statement::Select(select) => select,
        sql::ast::Statement::CreateTable(_) => {
            return Err(EngineError::unsupported(
                "executing a CREATE TABLE statement (only SELECT is runnable)",
            ))
        }
    };

    let plan = sql::planner::plan_select(select)?;
    execute(reader, &plan)
}
