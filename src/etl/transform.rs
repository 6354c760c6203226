//! Filter, cleaner and global filter traits
//!
//! Every transform carries an explicit `name`: it appears in the logs and
//! prefixes the `<name>_criteria` column written by dry runs.

use crate::dataset::Dataset;
use eyre::Result;
use serde_json::Value;

/// Per-example keep/drop predicate over a subject-column value
///
/// # Example
/// ```
/// use corpus_pipeline::etl::Filter;
/// use eyre::Result;
/// use serde_json::{Value, json};
///
/// struct HasDigits;
///
/// impl Filter for HasDigits {
///     fn name(&self) -> &str {
///         "has_digits"
///     }
///
///     fn keep(&self, value: &Value) -> Result<bool> {
///         Ok(value.as_str().is_some_and(|s| s.chars().any(|c| c.is_ascii_digit())))
///     }
/// }
///
/// assert!(HasDigits.keep(&json!("route 66")).unwrap());
/// assert_eq!(HasDigits.criteria(&json!("none")).unwrap(), json!(false));
/// ```
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the example survives this filter
    ///
    /// # Errors
    /// Any error aborts the whole run.
    fn keep(&self, value: &Value) -> Result<bool>;

    /// Value recorded in dry-run mode instead of dropping the row
    ///
    /// Defaults to the boolean verdict; override to report a score.
    fn criteria(&self, value: &Value) -> Result<Value> {
        self.keep(value).map(Value::Bool)
    }
}

/// Per-example rewrite of a subject-column value
pub trait Cleaner: Send + Sync {
    fn name(&self) -> &str;

    fn clean(&self, value: Value) -> Result<Value>;
}

/// Transform over the union of every participating source
///
/// Receives the whole dataset (including the `meta_data` source tag), the
/// global column and the dry-run flag, and returns its replacement. It may
/// drop, reorder or annotate rows, but must keep the `meta_data` column.
pub trait GlobalFilter: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, dataset: Dataset, column: &str, dry_run: bool) -> Result<Dataset>;
}

/// Filter backed by a named closure
pub struct FnFilter<F> {
    name: String,
    predicate: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&Value) -> Result<bool> + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&Value) -> Result<bool> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn keep(&self, value: &Value) -> Result<bool> {
        (self.predicate)(value)
    }
}

/// Cleaner backed by a named closure
pub struct FnCleaner<F> {
    name: String,
    rewrite: F,
}

impl<F> FnCleaner<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    pub fn new(name: impl Into<String>, rewrite: F) -> Self {
        Self {
            name: name.into(),
            rewrite,
        }
    }
}

impl<F> Cleaner for FnCleaner<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn clean(&self, value: Value) -> Result<Value> {
        (self.rewrite)(value)
    }
}

/// Global filter backed by a named closure
pub struct FnGlobalFilter<F> {
    name: String,
    apply: F,
}

impl<F> FnGlobalFilter<F>
where
    F: Fn(Dataset, &str, bool) -> Result<Dataset> + Send + Sync,
{
    pub fn new(name: impl Into<String>, apply: F) -> Self {
        Self {
            name: name.into(),
            apply,
        }
    }
}

impl<F> GlobalFilter for FnGlobalFilter<F>
where
    F: Fn(Dataset, &str, bool) -> Result<Dataset> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, dataset: Dataset, column: &str, dry_run: bool) -> Result<Dataset> {
        (self.apply)(dataset, column, dry_run)
    }
}
