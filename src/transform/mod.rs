//! Built-in transforms
//!
//! A small set of reference filters, cleaners and global filters that
//! manifests can name. The pipeline itself does not depend on any of them.

mod dedup;
mod length;
pub mod registry;
mod text;

pub use dedup::ExactDedup;
pub use length::{MaxLength, MinLength, NonEmpty};
pub use text::{Lowercase, NormalizeWhitespace, Uppercase};
