//! Single filter and cleaner steps over one column of a dataset

use super::{Cleaner, Filter};
use crate::dataset::{Dataset, NumProc, Row};
use eyre::{Result, WrapErr, eyre};
use serde_json::Value;

/// Suffix of the column a dry-run filter writes its criterion to
pub const CRITERIA_SUFFIX: &str = "_criteria";

/// Name of the dry-run column for `filter`
pub fn criteria_column(filter: &dyn Filter) -> String {
    format!("{}{}", filter.name(), CRITERIA_SUFFIX)
}

fn subject<'a>(row: &'a Row, column: &str) -> Result<&'a Value> {
    row.get(column)
        .ok_or_else(|| eyre!("Row has no column '{}'", column))
}

/// Run one filter over `column`
///
/// Drops rows the filter rejects. With `dry_run` nothing is dropped;
/// every row instead gets `<name>_criteria` set to the filter's criterion.
pub fn run_filter(
    dataset: &Dataset,
    column: &str,
    filter: &dyn Filter,
    dry_run: bool,
    num_proc: NumProc,
) -> Result<Dataset> {
    let name = filter.name();
    log::info!("Running filter: {} on {}", name, column);

    if dry_run {
        log::info!("Running in dry-run mode");
        let criteria_column = criteria_column(filter);
        dataset
            .map(
                |row| {
                    let criterion = filter.criteria(subject(row, column)?)?;
                    let mut update = Row::new();
                    update.insert(criteria_column.clone(), criterion);
                    Ok(update)
                },
                num_proc,
            )
            .wrap_err_with(|| format!("Filter '{}' failed on column '{}'", name, column))
    } else {
        dataset
            .filter(|row| filter.keep(subject(row, column)?), num_proc)
            .wrap_err_with(|| format!("Filter '{}' failed on column '{}'", name, column))
    }
}

/// Run one cleaner over `column`, replacing each value with its output
pub fn run_cleaner(
    dataset: &Dataset,
    column: &str,
    cleaner: &dyn Cleaner,
    num_proc: NumProc,
) -> Result<Dataset> {
    let name = cleaner.name();
    log::info!("Running cleaner: {} on {}", name, column);

    dataset
        .map(
            |row| {
                let cleaned = cleaner.clean(subject(row, column)?.clone())?;
                let mut update = Row::new();
                update.insert(column.to_string(), cleaned);
                Ok(update)
            },
            num_proc,
        )
        .wrap_err_with(|| format!("Cleaner '{}' failed on column '{}'", name, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::{FnCleaner, FnFilter};
    use serde_json::json;

    fn texts(values: &[&str]) -> Dataset {
        Dataset::from_columns([("text", values.iter().map(|v| json!(v)).collect())]).unwrap()
    }

    /// Length filter that reports the length as its dry-run criterion
    struct MinChars(usize);

    impl Filter for MinChars {
        fn name(&self) -> &str {
            "min_chars"
        }

        fn keep(&self, value: &Value) -> Result<bool> {
            Ok(value.as_str().unwrap_or_default().len() >= self.0)
        }

        fn criteria(&self, value: &Value) -> Result<Value> {
            Ok(json!(value.as_str().unwrap_or_default().len()))
        }
    }

    #[test]
    fn test_run_filter_drops_rows() {
        let dataset = texts(&["a", "abcd", "ab", "abcdef"]);
        let out = run_filter(&dataset, "text", &MinChars(3), false, NumProc::single()).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.rows()[0]["text"], json!("abcd"));
        assert_eq!(out.rows()[1]["text"], json!("abcdef"));
        assert!(!out.has_column("min_chars_criteria"));
    }

    #[test]
    fn test_run_filter_dry_run_annotates() {
        let dataset = texts(&["a", "abcd"]);
        let out = run_filter(&dataset, "text", &MinChars(3), true, NumProc::single()).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.rows()[0]["min_chars_criteria"], json!(1));
        assert_eq!(out.rows()[1]["min_chars_criteria"], json!(4));
        assert_eq!(out.rows()[0]["text"], json!("a"));
    }

    #[test]
    fn test_run_filter_dry_run_overwrites_criteria() {
        let dataset = texts(&["abc"])
            .with_column("min_chars_criteria", vec![json!("stale")])
            .unwrap();
        let out = run_filter(&dataset, "text", &MinChars(3), true, NumProc::single()).unwrap();

        assert_eq!(out.columns(), ["text", "min_chars_criteria"]);
        assert_eq!(out.rows()[0]["min_chars_criteria"], json!(3));
    }

    #[test]
    fn test_run_filter_missing_column() {
        let dataset = texts(&["abc"]);
        let err = run_filter(&dataset, "body", &MinChars(1), false, NumProc::single())
            .unwrap_err();

        assert!(err.to_string().contains("min_chars"));
        assert_eq!(err.root_cause().to_string(), "Row has no column 'body'");
    }

    #[test]
    fn test_run_filter_propagates_filter_error() {
        let failing = FnFilter::new("explodes", |_: &Value| Err(eyre!("kaboom")));
        let err = run_filter(&texts(&["x"]), "text", &failing, false, NumProc::single())
            .unwrap_err();

        assert_eq!(err.root_cause().to_string(), "kaboom");
    }

    #[test]
    fn test_run_cleaner_rewrites_column_only() {
        let dataset = texts(&["ab", "cd"])
            .with_column("id", vec![json!(1), json!(2)])
            .unwrap();
        let upper = FnCleaner::new("upper", |v: Value| {
            Ok(json!(v.as_str().unwrap_or_default().to_uppercase()))
        });
        let out = run_cleaner(&dataset, "text", &upper, NumProc::new(2).unwrap()).unwrap();

        assert_eq!(out.rows()[0]["text"], json!("AB"));
        assert_eq!(out.rows()[1]["text"], json!("CD"));
        assert_eq!(out.rows()[1]["id"], json!(2));
        assert_eq!(out.len(), 2);
    }
}
