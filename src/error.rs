use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("type not supported: {db_type} - {column}")]
    UnsupportedType { db_type: String, column: String },

    #[error("table '{0}' has no columns")]
    EmptyTable(String),

    #[error("malformed column in table '{table}': {reason}")]
    MalformedColumn { table: String, reason: &'static str },

    #[error("table '{0}' doesn't exist")]
    TableNotExist(String),

    #[error("column '{column}' doesn't exist in table '{table}'")]
    ColumnNotExist { table: String, column: String },

    #[error("{0}")]
    Base(&'static str),

    #[error("invalid datasource: {0}")]
    InvalidDatasource(&'static str),

    #[error("no database selected, name one in the datasource")]
    NoDatabaseSelected,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("parsing sql")]
    Parse(#[from] sqlparser::parser::ParserError),

    #[error("writing '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, GeneratorError::UnsupportedType { .. })
    }
}
