use thiserror::Error;

/// Result type alias for ufoq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline.
///
/// Malformed cell values and empty partitions are not errors: they are encoded
/// as [`Value::Missing`](crate::Value::Missing) in the data instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A stage referenced a column the table does not have
    #[error("Unknown column '{column}' in {stage}")]
    UnknownColumn {
        /// Offending column name
        column: String,
        /// Stage that performed the lookup
        stage: &'static str,
    },

    /// A stage was configured with parameters it cannot run with
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A schema listed the same column twice
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A row does not have one value per schema column
    #[error("Row {row} has {actual} values but the schema has {expected} columns")]
    RowWidth {
        /// Zero-based row position
        row: usize,
        /// Number of schema columns
        expected: usize,
        /// Number of values in the row
        actual: usize,
    },

    /// An arithmetic statistic met a text value
    #[error("Column '{column}' holds non-numeric value {value:?} in {stage}")]
    NonNumeric {
        /// Measured column
        column: String,
        /// Stage that hit the value
        stage: &'static str,
        /// The offending text
        value: String,
    },
}

impl Error {
    /// Create an unknown column error
    pub fn unknown_column(column: impl Into<String>, stage: &'static str) -> Self {
        Error::UnknownColumn {
            column: column.into(),
            stage,
        }
    }

    /// Create an invalid configuration error with a custom message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }
}
