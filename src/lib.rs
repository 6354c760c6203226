//! Corpus Pipeline
//!
//! Sequences per-example filters and cleaners over named text sources, then
//! optionally runs global filters over the union of all sources and splits
//! the result back into per-source datasets.

pub mod cli;
pub mod dataset;
pub mod etl;
pub mod manifest;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use dataset::{Axis, Dataset, NumProc, Row};
pub use etl::{
    Cleaner, Extractor, Filter, GlobalCleaning, GlobalFilter, Loader, Pipeline, RunOptions,
    RunSummary, Source, Stage,
};
pub use manifest::PipelineManifest;
pub use storage::{NdjsonReader, NdjsonWriter, OutputDirectory};
