//! Pipeline orchestration: per-source stage, then the optional global stage

use super::global::run_global_stage;
use super::steps::{run_cleaner, run_filter};
use super::{RunOptions, Source};
use eyre::Result;

/// Progress of a single run
///
/// `Init → PerSourceDone → (GlobalDone | GlobalSkipped) → Complete`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    PerSourceDone,
    GlobalDone,
    GlobalSkipped,
    Complete,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// `GlobalDone` or `GlobalSkipped`
    pub global: Stage,
    /// Final stage reached; always `Complete` for a returned summary
    pub stage: Stage,
    /// Row count of every source after the run, in pipeline order
    pub rows: Vec<(String, usize)>,
}

/// A collection of sources and the transforms to run over them
///
/// # Example
/// ```
/// use corpus_pipeline::dataset::{Dataset, NumProc};
/// use corpus_pipeline::etl::{FnCleaner, FnFilter, Pipeline, RunOptions, Source};
/// use serde_json::{Value, json};
///
/// # fn main() -> eyre::Result<()> {
/// let dataset = Dataset::from_columns([("text", vec![json!("abc"), json!("xyz")])])?;
/// let source = Source::new("letters", ["text"], dataset)
///     .with_cleaner(FnCleaner::new("upper", |v: Value| {
///         Ok(json!(v.as_str().unwrap_or_default().to_uppercase()))
///     }))
///     .with_filter(FnFilter::new("starts_with_a", |v: &Value| {
///         Ok(v.as_str().is_some_and(|s| s.starts_with('A')))
///     }));
///
/// let mut pipeline = Pipeline::new(vec![source]);
/// pipeline.run(
///     RunOptions::default()
///         .cleaning_first(true)
///         .num_proc(NumProc::single()),
/// )?;
///
/// assert_eq!(pipeline.sources()[0].dataset.rows()[0]["text"], json!("ABC"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline {
    sources: Vec<Source>,
}

impl Pipeline {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn into_sources(self) -> Vec<Source> {
        self.sources
    }

    /// Look up a source by name
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Run every source's filters and cleaners, then the global stage
    ///
    /// Each source's `dataset` is replaced in place. A failing step aborts
    /// the run; the source it was working on keeps its last good dataset.
    ///
    /// # Errors
    /// Returns the first error raised by a transform or by the dataset engine
    pub fn run(&mut self, options: RunOptions) -> Result<RunSummary> {
        let mut stage = Stage::Init;
        log::debug!("Pipeline stage: {:?}", stage);
        log::debug!("Run options: {:?}", options);

        for source in &mut self.sources {
            run_source(source, &options)?;
        }
        stage = advance(stage, Stage::PerSourceDone);

        let global = if options.global_filters.is_empty() {
            Stage::GlobalSkipped
        } else {
            run_global_stage(&mut self.sources, &options)?;
            Stage::GlobalDone
        };
        stage = advance(stage, global);
        stage = advance(stage, Stage::Complete);

        let rows = self
            .sources
            .iter()
            .map(|s| (s.name.clone(), s.dataset.len()))
            .collect();

        Ok(RunSummary {
            global,
            stage,
            rows,
        })
    }
}

fn advance(from: Stage, to: Stage) -> Stage {
    log::debug!("Pipeline stage: {:?} -> {:?}", from, to);
    to
}

/// Per-source stage for one source
fn run_source(source: &mut Source, options: &RunOptions) -> Result<()> {
    let column = source.subject_column()?.to_string();
    log::info!("Running datasource: {}", source.name);
    let before = source.dataset.len();

    if options.cleaning_first {
        apply_cleaners(source, &column, options)?;
        apply_filters(source, &column, options)?;
    } else {
        apply_filters(source, &column, options)?;
        apply_cleaners(source, &column, options)?;
    }

    log::info!(
        "Datasource {}: {} -> {} row(s)",
        source.name,
        before,
        source.dataset.len()
    );
    Ok(())
}

fn apply_filters(source: &mut Source, column: &str, options: &RunOptions) -> Result<()> {
    for filter in &source.filters {
        source.dataset = run_filter(
            &source.dataset,
            column,
            filter.as_ref(),
            options.dry_run,
            options.num_proc,
        )?;
    }
    Ok(())
}

fn apply_cleaners(source: &mut Source, column: &str, options: &RunOptions) -> Result<()> {
    for cleaner in &source.cleaners {
        source.dataset = run_cleaner(&source.dataset, column, cleaner.as_ref(), options.num_proc)?;
    }
    Ok(())
}
