//! Global stage: union participating sources, run global transforms,
//! then split the result back out by source name

use super::steps::run_cleaner;
use super::{GlobalCleaning, RunOptions, Source};
use crate::dataset::{Axis, Dataset, NumProc, concatenate};
use eyre::{Result, WrapErr, bail, eyre};
use serde_json::Value;
use std::collections::HashSet;

/// Column tagging each row of the union with the name of its source
pub const META_COLUMN: &str = "meta_data";

/// Run the global stage over `sources`, rebinding each participant's dataset
///
/// Nothing is written back unless every global transform and the
/// re-partition succeed.
pub(crate) fn run_global_stage(sources: &mut [Source], options: &RunOptions) -> Result<()> {
    let global_column = sources
        .first()
        .ok_or_else(|| eyre!("Global filters need at least one source"))?
        .subject_column()?
        .to_string();

    let participants: Vec<usize> = sources
        .iter()
        .enumerate()
        .filter(|(_, source)| !source.skip_global)
        .map(|(i, _)| i)
        .collect();
    ensure_unique_names(sources, &participants)?;

    log::info!(
        "Running global stage on {} over {} source(s)",
        global_column,
        participants.len()
    );
    let mut union = build_union(sources, &participants)?;
    log::debug!("Union holds {} row(s)", union.len());

    let apply_cleaners = options.global_cleaning == GlobalCleaning::Applied;
    if !apply_cleaners && !options.global_cleaners.is_empty() {
        log::warn!(
            "{} global cleaner(s) configured but global cleaning is inert, skipping",
            options.global_cleaners.len()
        );
    }

    if apply_cleaners && options.globals_first {
        union = clean_union(union, &global_column, options)?;
    }

    for filter in &options.global_filters {
        log::info!("Running global filter: {}", filter.name());
        union = filter
            .apply(union, &global_column, options.dry_run)
            .wrap_err_with(|| format!("Global filter '{}' failed", filter.name()))?;
    }

    if apply_cleaners && !options.globals_first {
        union = clean_union(union, &global_column, options)?;
    }

    let parts = partition(&union, sources, &participants, options.num_proc)?;
    for (i, dataset) in participants.into_iter().zip(parts) {
        sources[i].dataset = dataset;
    }
    Ok(())
}

fn ensure_unique_names(sources: &[Source], participants: &[usize]) -> Result<()> {
    let mut seen = HashSet::new();
    for &i in participants {
        if !seen.insert(sources[i].name.as_str()) {
            bail!(
                "Source name '{}' is used more than once in the global stage",
                sources[i].name
            );
        }
    }
    Ok(())
}

/// Row-wise union of the participants with a `meta_data` column attached
fn build_union(sources: &[Source], participants: &[usize]) -> Result<Dataset> {
    let datasets: Vec<&Dataset> = participants.iter().map(|&i| &sources[i].dataset).collect();
    let stacked = concatenate(&datasets, Axis::Rows).wrap_err("Failed to union sources")?;

    let tags: Vec<Value> = participants
        .iter()
        .flat_map(|&i| {
            let source = &sources[i];
            std::iter::repeat_n(Value::String(source.name.clone()), source.dataset.len())
        })
        .collect();
    let meta = Dataset::from_columns([(META_COLUMN, tags)])?;

    concatenate(&[&stacked, &meta], Axis::Columns).wrap_err("Failed to tag union rows")
}

fn clean_union(union: Dataset, column: &str, options: &RunOptions) -> Result<Dataset> {
    let mut union = union;
    for cleaner in &options.global_cleaners {
        union = run_cleaner(&union, column, cleaner.as_ref(), options.num_proc)?;
    }
    Ok(union)
}

/// Split the union back into one dataset per participant, tag column removed
fn partition(
    union: &Dataset,
    sources: &[Source],
    participants: &[usize],
    num_proc: NumProc,
) -> Result<Vec<Dataset>> {
    let mut parts = Vec::with_capacity(participants.len());
    let mut claimed = 0;

    for &i in participants {
        let name = sources[i].name.as_str();
        let part = union
            .filter(
                |row| match row.get(META_COLUMN) {
                    Some(Value::String(tag)) => Ok(tag == name),
                    Some(other) => Err(eyre!("Unexpected {} value: {}", META_COLUMN, other)),
                    None => Err(eyre!("Row lost its '{}' column", META_COLUMN)),
                },
                num_proc,
            )
            .wrap_err_with(|| format!("Failed to recover source '{}'", name))?;

        log::debug!("Recovered {} row(s) for {}", part.len(), name);
        claimed += part.len();
        parts.push(part.without_column(META_COLUMN));
    }

    if claimed != union.len() {
        bail!(
            "{} row(s) of the union are tagged with no participating source",
            union.len() - claimed
        );
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::{FnCleaner, FnGlobalFilter};
    use serde_json::json;

    fn texts(values: &[&str]) -> Dataset {
        Dataset::from_columns([("text", values.iter().map(|v| json!(v)).collect())]).unwrap()
    }

    fn strs(dataset: &Dataset) -> Vec<String> {
        dataset
            .column("text")
            .unwrap()
            .into_iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    fn options() -> RunOptions {
        RunOptions::default().num_proc(NumProc::single())
    }

    #[test]
    fn test_union_tags_rows_in_order() {
        let sources = vec![
            Source::new("a", ["text"], texts(&["a1", "a2"])),
            Source::new("skip", ["text"], texts(&["s1"])).skip_global(true),
            Source::new("b", ["text"], texts(&["b1"])),
        ];

        let union = build_union(&sources, &[0, 2]).unwrap();
        let tags: Vec<&Value> = union.column(META_COLUMN).unwrap();

        assert_eq!(strs(&union), ["a1", "a2", "b1"]);
        assert_eq!(tags, [&json!("a"), &json!("a"), &json!("b")]);
    }

    #[test]
    fn test_duplicate_participant_names_rejected() {
        let mut sources = vec![
            Source::new("a", ["text"], texts(&["x"])),
            Source::new("a", ["text"], texts(&["y"])),
        ];
        let options = options().with_global_filter(FnGlobalFilter::new(
            "noop",
            |d: Dataset, _: &str, _| Ok(d),
        ));

        let err = run_global_stage(&mut sources, &options).unwrap_err();
        assert!(err.to_string().contains("'a'"));
        assert_eq!(strs(&sources[0].dataset), ["x"]);
    }

    #[test]
    fn test_duplicate_name_allowed_when_skipped() {
        let mut sources = vec![
            Source::new("a", ["text"], texts(&["x"])),
            Source::new("a", ["text"], texts(&["y"])).skip_global(true),
        ];
        let options = options().with_global_filter(FnGlobalFilter::new(
            "noop",
            |d: Dataset, _: &str, _| Ok(d),
        ));

        run_global_stage(&mut sources, &options).unwrap();
        assert_eq!(strs(&sources[0].dataset), ["x"]);
        assert_eq!(strs(&sources[1].dataset), ["y"]);
    }

    #[test]
    fn test_dropping_meta_column_is_an_error() {
        let mut sources = vec![Source::new("a", ["text"], texts(&["x", "y"]))];
        let options = options().with_global_filter(FnGlobalFilter::new(
            "strip_meta",
            |d: Dataset, _: &str, _| Ok(d.without_column(META_COLUMN)),
        ));

        let err = run_global_stage(&mut sources, &options).unwrap_err();
        assert!(format!("{:#}", err).contains("meta_data"));
        // untouched on failure
        assert_eq!(strs(&sources[0].dataset), ["x", "y"]);
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let mut sources = vec![Source::new("a", ["text"], texts(&["x"]))];
        let options = options().with_global_filter(FnGlobalFilter::new(
            "retag",
            |d: Dataset, _: &str, _| d.with_column(META_COLUMN, vec![json!("ghost")]),
        ));

        assert!(run_global_stage(&mut sources, &options).is_err());
        assert_eq!(strs(&sources[0].dataset), ["x"]);
    }

    #[test]
    fn test_global_cleaners_inert_by_default() {
        let mut sources = vec![Source::new("a", ["text"], texts(&["x"]))];
        let options = options()
            .with_global_filter(FnGlobalFilter::new("noop", |d: Dataset, _: &str, _| Ok(d)))
            .with_global_cleaner(FnCleaner::new("upper", |_: Value| Ok(json!("CHANGED"))));

        run_global_stage(&mut sources, &options).unwrap();
        assert_eq!(strs(&sources[0].dataset), ["x"]);
    }

    #[test]
    fn test_global_stage_uses_first_source_column() {
        let mut sources = vec![
            Source::new("first", ["body"], Dataset::new()).skip_global(true),
            Source::new(
                "second",
                ["text"],
                Dataset::from_columns([("body", vec![json!("keep"), json!("drop")])]).unwrap(),
            ),
        ];
        let options = options().with_global_filter(FnGlobalFilter::new(
            "drop_word",
            |d: Dataset, column: &str, _| {
                let column = column.to_string();
                d.filter(move |row| Ok(row[&column] != json!("drop")), NumProc::single())
            },
        ));

        run_global_stage(&mut sources, &options).unwrap();
        assert_eq!(sources[1].dataset.len(), 1);
        assert_eq!(sources[1].dataset.rows()[0]["body"], json!("keep"));
    }
}
