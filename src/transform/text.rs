//! Text cleaners

use crate::etl::Cleaner;
use eyre::{Context, Result, eyre};
use regex::Regex;
use serde_json::Value;

fn rewrite(cleaner: &str, value: Value, f: impl FnOnce(&str) -> String) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(f(&s))),
        Value::Null => Ok(Value::Null),
        other => Err(eyre!("{} expects a string value, got {}", cleaner, other)),
    }
}

/// Collapse runs of whitespace into a single space and trim the ends
///
/// # Example
/// ```
/// use corpus_pipeline::etl::Cleaner;
/// use corpus_pipeline::transform::NormalizeWhitespace;
/// use serde_json::json;
///
/// let cleaner = NormalizeWhitespace::new().unwrap();
/// let output = cleaner.clean(json!("  hello \n\t world  ")).unwrap();
/// assert_eq!(output, json!("hello world"));
/// ```
pub struct NormalizeWhitespace {
    runs: Regex,
}

impl NormalizeWhitespace {
    pub fn new() -> Result<Self> {
        let runs = Regex::new(r"\s+").context("Failed to compile whitespace pattern")?;
        Ok(Self { runs })
    }
}

impl Cleaner for NormalizeWhitespace {
    fn name(&self) -> &str {
        "normalize_whitespace"
    }

    fn clean(&self, value: Value) -> Result<Value> {
        rewrite(self.name(), value, |s| {
            self.runs.replace_all(s, " ").trim().to_string()
        })
    }
}

pub struct Lowercase;

impl Cleaner for Lowercase {
    fn name(&self) -> &str {
        "lowercase"
    }

    fn clean(&self, value: Value) -> Result<Value> {
        rewrite(self.name(), value, str::to_lowercase)
    }
}

pub struct Uppercase;

impl Cleaner for Uppercase {
    fn name(&self) -> &str {
        "uppercase"
    }

    fn clean(&self, value: Value) -> Result<Value> {
        rewrite(self.name(), value, str::to_uppercase)
    }
}
