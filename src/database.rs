//! The facade the CLI drives: opens a database file and answers the two
//! meta-commands (`.dbinfo`, `.tables`) plus hands the reader to the SQL
//! executor for everything else.
//!
//! Grounded on the teacher's `database.rs::Database`, generalized from a
//! single struct bundling metadata + one schema B-tree into a thin wrapper
//! around `Reader` + the standalone `schema` module.

use itertools::Itertools;

use crate::error::Result;
use crate::reader::Reader;
use crate::schema::{load_schemas, TableSchema};

pub struct Database {
    reader: Reader,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        Ok(Database {
            reader: Reader::open(path)?,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.reader.header.page_size
    }

    /// Every row of the schema table (page 1), covering tables, indices
    /// and any other catalog object kind, in decoded (rowid-ascending)
    /// order.
    pub fn schema_entries(&mut self) -> Result<Vec<TableSchema>> {
        load_schemas(&mut self.reader)
    }

    /// Number of cells on the schema page. This is what `.dbinfo` reports
    /// as "number of tables" (it counts every schema-table row, not just
    /// user tables, matching the historical CLI behaviour).
    pub fn schema_cell_count(&mut self) -> Result<u64> {
        Ok(self.schema_entries()?.len() as u64)
    }

    /// User table names for `.tables`, space-joined in reverse of
    /// decoded-cell order, a historical quirk of the on-disk insertion
    /// order preserved for bit-compatible CLI output.
    pub fn user_table_names(&mut self) -> Result<String> {
        Ok(self
            .schema_entries()?
            .into_iter()
            .filter(|s| s.obj_type == "table" && !s.table_name.starts_with("sqlite_"))
            .map(|s| s.table_name)
            .rev()
            .join(" "))
    }

    pub fn reader_mut(&mut self) -> &mut Reader {
        &mut self.reader
    }
}
