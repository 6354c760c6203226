//! Cross-source exact deduplication

use crate::dataset::Dataset;
use crate::etl::{CRITERIA_SUFFIX, GlobalFilter};
use eyre::{Result, eyre};
use serde_json::Value;
use std::collections::HashSet;

/// Keep the first row for each distinct value of the global column
///
/// Rows are compared by their exact JSON value, so `"a"` and `"a "` are
/// different. In dry-run mode no row is dropped; `exact_dedup_criteria`
/// is `true` on first occurrences and `false` on duplicates.
///
/// # Example
/// ```
/// use corpus_pipeline::dataset::Dataset;
/// use corpus_pipeline::etl::GlobalFilter;
/// use corpus_pipeline::transform::ExactDedup;
/// use serde_json::json;
///
/// let dataset = Dataset::from_columns([("text", vec![json!("a"), json!("b"), json!("a")])]).unwrap();
/// let deduped = ExactDedup.apply(dataset, "text", false).unwrap();
/// assert_eq!(deduped.len(), 2);
/// ```
pub struct ExactDedup;

impl ExactDedup {
    fn first_occurrences(dataset: &Dataset, column: &str) -> Result<Vec<bool>> {
        let mut seen = HashSet::new();
        dataset
            .rows()
            .iter()
            .map(|row| {
                let value = row
                    .get(column)
                    .ok_or_else(|| eyre!("Row has no column '{}'", column))?;
                Ok(seen.insert(value.to_string()))
            })
            .collect()
    }
}

impl GlobalFilter for ExactDedup {
    fn name(&self) -> &str {
        "exact_dedup"
    }

    fn apply(&self, dataset: Dataset, column: &str, dry_run: bool) -> Result<Dataset> {
        let firsts = Self::first_occurrences(&dataset, column)?;
        let duplicates = firsts.iter().filter(|first| !**first).count();

        if dry_run {
            log::info!("{} duplicate row(s) flagged", duplicates);
            let criteria = firsts.into_iter().map(Value::Bool).collect();
            return dataset.with_column(format!("{}{}", self.name(), CRITERIA_SUFFIX), criteria);
        }

        log::info!("{} duplicate row(s) removed", duplicates);
        let keep: Vec<usize> = firsts
            .iter()
            .enumerate()
            .filter_map(|(i, first)| first.then_some(i))
            .collect();
        dataset.select(&keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset::from_columns([
            ("text", vec![json!("a"), json!("b"), json!("a"), json!("c"), json!("b")]),
            ("meta_data", vec![json!("x"), json!("x"), json!("y"), json!("y"), json!("y")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let out = ExactDedup.apply(dataset(), "text", false).unwrap();

        let texts: Vec<&Value> = out.column("text").unwrap();
        assert_eq!(texts, [&json!("a"), &json!("b"), &json!("c")]);
        let tags: Vec<&Value> = out.column("meta_data").unwrap();
        assert_eq!(tags, [&json!("x"), &json!("x"), &json!("y")]);
    }

    #[test]
    fn test_dedup_dry_run_flags() {
        let out = ExactDedup.apply(dataset(), "text", true).unwrap();

        assert_eq!(out.len(), 5);
        let flags: Vec<&Value> = out.column("exact_dedup_criteria").unwrap();
        assert_eq!(
            flags,
            [&json!(true), &json!(true), &json!(false), &json!(true), &json!(false)]
        );
    }

    #[test]
    fn test_dedup_missing_column() {
        assert!(ExactDedup.apply(dataset(), "body", false).is_err());
    }
}
