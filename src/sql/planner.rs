//! Lowers a parsed `SelectStatement` into an `ExecutionPlan` the executor
//! can drive directly against the schema catalog and B-tree walker.
//!
//! Grounded on the original implementation's `Planner.preparePlan`
//! (`original_source/app/planner.go`), which walks the parsed field list
//! and special-cases aggregate nodes into a separate `aggFunc` list while
//! ordinary fields become `columns`. The same split is kept here.

use crate::error::{EngineError, Result};
use crate::sql::ast::{Aggregate, Field, Literal, SelectStatement, WhereClause};

#[derive(Debug, Clone)]
pub struct Predicate {
    pub column: String,
    pub literal: Literal,
}

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub table: String,
    /// Ordinary column projections, in the order they appeared in the
    /// SELECT list. Empty when the statement is `SELECT *` or a bare
    /// aggregate.
    pub projections: Vec<String>,
    /// `true` for `SELECT *`; projections are resolved to every column in
    /// the table's CREATE TABLE order at execution time.
    pub select_star: bool,
    pub aggregates: Vec<Aggregate>,
    pub predicate: Option<Predicate>,
}

pub fn plan_select(stmt: SelectStatement) -> Result<ExecutionPlan> {
    let mut projections = Vec::new();
    let mut aggregates = Vec::new();
    let mut select_star = false;

    for field in stmt.fields {
        match field {
            Field::Star => select_star = true,
            Field::Column(name) => projections.push(name),
            Field::Aggregate(agg) => aggregates.push(agg),
        }
    }

    if !aggregates.is_empty() && (!projections.is_empty() || select_star) {
        return Err(EngineError::unsupported(
            "mixing aggregates with ordinary column projections in one SELECT",
        ));
    }

    let predicate = stmt.where_clause.map(|WhereClause { field, value }| Predicate {
        column: field,
        literal: value,
    });

    Ok(ExecutionPlan {
        table: stmt.from,
        projections,
        select_star,
        aggregates,
        predicate,
    })
}
