#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Ground-truth frame annotations reader.
pub mod annotations;

/// COLMAP text format reader.
pub mod colmap;

/// Delimited text writer for tables.
pub mod csv;

/// Typed access to ground-truth viewpoints.
pub mod viewpoint;
