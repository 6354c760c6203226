//! Sequencing of filters and cleaners over named data sources
//!
//! A [`Pipeline`] runs each [`Source`]'s per-example transforms over its
//! subject column, then optionally unions the sources, runs
//! [`GlobalFilter`]s across the union and splits the result back out by
//! source name. [`Extractor`] and [`Loader`] are the I/O seams used to get
//! data in and out of a run.

mod extract;
mod global;
mod load;
mod options;
mod pipeline;
mod source;
mod steps;
mod transform;

pub use extract::Extractor;
pub use global::META_COLUMN;
pub use load::Loader;
pub use options::{GlobalCleaning, RunOptions};
pub use pipeline::{Pipeline, RunSummary, Stage};
pub use source::Source;
pub use steps::{CRITERIA_SUFFIX, criteria_column, run_cleaner, run_filter};
pub use transform::{Cleaner, Filter, FnCleaner, FnFilter, FnGlobalFilter, GlobalFilter};
