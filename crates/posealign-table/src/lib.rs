#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Table cell values.
pub mod cell;

/// Error types for the table module.
pub mod error;

/// Relational operations over row collections.
pub mod relation;

/// Column-named, row-major table.
pub mod table;

pub use cell::Cell;
pub use error::TableError;
pub use relation::{JoinSuffixes, Relation};
pub use table::{RowRef, Table};
