/// An error type for the table module.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    /// The requested column does not exist.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A row does not have as many cells as the table has columns.
    #[error("Row width mismatch. Expected {expected} cells, got {got}")]
    RowWidthMismatch {
        /// Number of columns in the table.
        expected: usize,
        /// Number of cells in the row.
        got: usize,
    },

    /// Two columns share the same name.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}
