#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use posealign_io as io;

#[doc(inline)]
pub use posealign_table as table;

/// Alignment of pose and annotation tables.
pub mod align;

/// Error types for the alignment pipeline.
pub mod error;

/// End-to-end composition of readers, aligner and writer.
pub mod pipeline;

pub use align::{align, align_with_config, AlignConfig};
pub use error::AlignError;
pub use pipeline::{run, PipelineConfig};
