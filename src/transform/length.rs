//! Length-based filters
//!
//! Lengths are counted in characters. In dry-run mode the criterion is the
//! length itself rather than the keep/drop verdict.

use crate::etl::Filter;
use eyre::{Result, eyre};
use serde_json::{Value, json};

fn text_len(filter: &str, value: &Value) -> Result<usize> {
    value
        .as_str()
        .map(|s| s.chars().count())
        .ok_or_else(|| eyre!("{} expects a string value, got {}", filter, value))
}

/// Keep examples with at least `min` characters
///
/// # Example
/// ```
/// use corpus_pipeline::etl::Filter;
/// use corpus_pipeline::transform::MinLength;
/// use serde_json::json;
///
/// let filter = MinLength::new(3);
/// assert!(filter.keep(&json!("abc")).unwrap());
/// assert!(!filter.keep(&json!("ab")).unwrap());
/// assert_eq!(filter.criteria(&json!("ab")).unwrap(), json!(2));
/// ```
pub struct MinLength {
    min: usize,
}

impl MinLength {
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

impl Filter for MinLength {
    fn name(&self) -> &str {
        "min_length"
    }

    fn keep(&self, value: &Value) -> Result<bool> {
        Ok(text_len(self.name(), value)? >= self.min)
    }

    fn criteria(&self, value: &Value) -> Result<Value> {
        Ok(json!(text_len(self.name(), value)?))
    }
}

/// Keep examples with at most `max` characters
pub struct MaxLength {
    max: usize,
}

impl MaxLength {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Filter for MaxLength {
    fn name(&self) -> &str {
        "max_length"
    }

    fn keep(&self, value: &Value) -> Result<bool> {
        Ok(text_len(self.name(), value)? <= self.max)
    }

    fn criteria(&self, value: &Value) -> Result<Value> {
        Ok(json!(text_len(self.name(), value)?))
    }
}

/// Drop null values and strings that are empty after trimming
pub struct NonEmpty;

impl Filter for NonEmpty {
    fn name(&self) -> &str {
        "non_empty"
    }

    fn keep(&self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
    }
}
