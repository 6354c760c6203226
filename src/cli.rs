//! CLI helper functions

use crate::{
    dataset::{Dataset, NumProc},
    etl::{Extractor, Loader, Pipeline, RunOptions, RunSummary, Source},
    manifest::{ManifestOptions, PipelineManifest},
    storage::{NdjsonReader, OutputDirectory},
    transform::registry::{build_cleaner, build_filter, build_global_filter},
};
use eyre::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Environment variable overriding `options.num_proc`
pub const NUM_PROC_VAR: &str = "CORPUS_NUM_PROC";
/// Environment variable overriding `options.dry_run`
pub const DRY_RUN_VAR: &str = "CORPUS_DRY_RUN";

/// Command-line flags that take precedence over the manifest and environment
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub dry_run: bool,
    pub cleaning_first: bool,
    pub num_proc: Option<usize>,
}

fn parse_flag(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{} must be a boolean, got '{}'", var, other),
    }
}

/// Apply `CORPUS_NUM_PROC` and `CORPUS_DRY_RUN` on top of manifest options
pub fn apply_env_overrides(options: &mut ManifestOptions) -> Result<()> {
    if let Ok(value) = std::env::var(NUM_PROC_VAR) {
        let num_proc: NumProc = value
            .parse()
            .with_context(|| format!("Invalid {}", NUM_PROC_VAR))?;
        options.num_proc = Some(num_proc.get());
    }
    if let Ok(value) = std::env::var(DRY_RUN_VAR) {
        options.dry_run = parse_flag(DRY_RUN_VAR, &value)?;
    }
    Ok(())
}

/// Apply command-line flags on top of manifest options
pub fn apply_cli_overrides(options: &mut ManifestOptions, overrides: &RunOverrides) {
    options.dry_run |= overrides.dry_run;
    options.cleaning_first |= overrides.cleaning_first;
    if overrides.num_proc.is_some() {
        options.num_proc = overrides.num_proc;
    }
}

/// Build the run options for a manifest, resolving global transforms
pub fn run_options(manifest: &PipelineManifest) -> Result<RunOptions> {
    let opts = &manifest.options;
    let num_proc = match opts.num_proc {
        Some(n) => NumProc::new(n)?,
        None => NumProc::available(),
    };

    let mut options = RunOptions::default()
        .cleaning_first(opts.cleaning_first)
        .globals_first(opts.globals_first)
        .dry_run(opts.dry_run)
        .num_proc(num_proc)
        .global_cleaning(opts.global_cleaning);

    for spec in &manifest.global_filters {
        options.global_filters.push(build_global_filter(spec)?);
    }
    for spec in &manifest.global_cleaners {
        options.global_cleaners.push(build_cleaner(spec)?);
    }
    Ok(options)
}

/// Build every source descriptor of a manifest around `datasets`
fn build_sources(manifest: &PipelineManifest, datasets: Vec<Dataset>) -> Result<Vec<Source>> {
    manifest
        .sources
        .iter()
        .zip(datasets)
        .map(|(entry, dataset)| -> Result<Source> {
            let mut source = Source::new(&entry.name, &entry.columns, dataset)
                .skip_global(entry.skip_global);
            for spec in &entry.filters {
                source.filters.push(
                    build_filter(spec)
                        .with_context(|| format!("In source '{}'", entry.name))?,
                );
            }
            for spec in &entry.cleaners {
                source.cleaners.push(
                    build_cleaner(spec)
                        .with_context(|| format!("In source '{}'", entry.name))?,
                );
            }
            Ok(source)
        })
        .collect()
}

/// Check that a manifest parses and every transform it names exists
///
/// Returns the number of sources. No data is read.
pub fn check_manifest(manifest_path: impl AsRef<Path>) -> Result<usize> {
    let manifest = PipelineManifest::read(manifest_path)?;
    run_options(&manifest)?;
    OutputDirectory::ensure_distinct(manifest.sources.iter().map(|s| s.name.as_str()))?;
    let placeholders = manifest.sources.iter().map(|_| Dataset::new()).collect();
    let sources = build_sources(&manifest, placeholders)?;

    for source in &sources {
        log::info!(
            "Source {}: {} filter(s), {} cleaner(s){}",
            source.name,
            source.filters.len(),
            source.cleaners.len(),
            if source.skip_global { ", skips global" } else { "" }
        );
    }
    Ok(sources.len())
}

/// Read every source file named by the manifest
async fn load_datasets(manifest: &PipelineManifest) -> Result<Vec<Dataset>> {
    let mut datasets = Vec::with_capacity(manifest.count());
    for entry in &manifest.sources {
        let reader = NdjsonReader::new(manifest.source_path(entry));
        let rows = reader
            .extract()
            .await
            .with_context(|| format!("Failed to load source '{}'", entry.name))?;
        log::info!(
            "Loaded {} row(s) for {} from {}",
            rows.len(),
            entry.name,
            reader.path().display()
        );
        datasets.push(Dataset::from_rows(rows));
    }
    Ok(datasets)
}

/// Default output location: `output/` next to the manifest
pub fn default_output_dir(manifest_path: impl AsRef<Path>) -> PathBuf {
    manifest_path
        .as_ref()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
        .join("output")
}

/// Load a manifest, run its pipeline and write one NDJSON file per source
///
/// Pipeline: NdjsonReader → per-source filters/cleaners → global filters → OutputDirectory
pub async fn run_manifest(
    manifest_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    overrides: &RunOverrides,
) -> Result<RunSummary> {
    let manifest_path = manifest_path.as_ref();

    log::info!("Loading manifest from {}", manifest_path.display());
    let mut manifest = PipelineManifest::read(manifest_path)?;
    apply_env_overrides(&mut manifest.options)?;
    apply_cli_overrides(&mut manifest.options, overrides);
    log::info!("Manifest loaded: {} source(s)", manifest.count());

    let options = run_options(&manifest)?;
    OutputDirectory::ensure_distinct(manifest.sources.iter().map(|s| s.name.as_str()))?;
    let datasets = load_datasets(&manifest).await?;
    let mut pipeline = Pipeline::new(build_sources(&manifest, datasets)?);

    let summary = pipeline.run(options)?;

    let output = OutputDirectory::new(output_dir)?;
    output.clear()?;
    let items = pipeline
        .into_sources()
        .into_iter()
        .map(|source| (source.name, source.dataset))
        .collect();
    let count = output.load(items).await?;
    log::info!("✓ Wrote {} source(s) to {}", count, output.path().display());

    Ok(summary)
}
