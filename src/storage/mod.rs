//! File system storage operations
//!
//! This module handles all file I/O operations including:
//! - NDJSON file reading/writing
//! - Per-source output directories

mod ndjson;
mod output;

pub use ndjson::{NdjsonReader, NdjsonWriter};
pub use output::OutputDirectory;
