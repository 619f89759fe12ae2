use std::path::PathBuf;

use posealign_io::{annotations::AnnotationError, colmap::PoseFileError, csv::CsvError};
use posealign_table::TableError;

/// An error type for the alignment pipeline.
///
/// Each variant names the stage that failed and, for file stages, the file involved.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Reading the predicted poses failed.
    #[error("Failed to read predicted poses from {path}: {source}")]
    Poses {
        /// Path to the images.txt file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: PoseFileError,
    },

    /// Reading the ground-truth annotations failed.
    #[error("Failed to read ground-truth annotations from {path}: {source}")]
    Annotations {
        /// Path to the annotations file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: AnnotationError,
    },

    /// A table operation failed while aligning.
    #[error("Failed to align poses. {0}")]
    Table(#[from] TableError),

    /// Writing the aligned table failed.
    #[error("Failed to write aligned poses to {path}: {source}")]
    Sink {
        /// Path to the output file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: CsvError,
    },
}
