use thiserror::Error;

/// The closed set of ways a query over an on-disk database can fail.
///
/// Every component (pager, page/cell/record decoder, B-tree walker, schema
/// catalog, SQL front-end) reports through this enum so the CLI can print a
/// single-line diagnostic and exit nonzero regardless of where the failure
/// originated.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed database file ({context}): {detail}")]
    Malformed { context: String, detail: String },

    #[error("unsupported: {what}")]
    Unsupported { what: String },

    #[error("syntax error at position {position}: expected {expected}, found {found}")]
    Syntax {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("table not found: {table}")]
    NotFound { table: String },

    #[error("type mismatch on column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn malformed(context: impl Into<String>, detail: impl Into<String>) -> Self {
        EngineError::Malformed {
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        EngineError::Unsupported { what: what.into() }
    }
}
