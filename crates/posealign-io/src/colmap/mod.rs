mod text;
pub use text::*;

mod types;
pub use types::*;
