//! Source descriptors: one named dataset plus its transforms

use super::{Cleaner, Filter};
use crate::dataset::Dataset;
use eyre::{Result, eyre};

/// A named unit of work for the pipeline
///
/// Only `columns[0]` (the subject column) is read by the pipeline; the
/// remaining entries are carried for callers. `dataset` is replaced after
/// every successful transform step.
pub struct Source {
    pub name: String,
    pub columns: Vec<String>,
    pub dataset: Dataset,
    pub filters: Vec<Box<dyn Filter>>,
    pub cleaners: Vec<Box<dyn Cleaner>>,
    /// Leave this source out of the global union
    pub skip_global: bool,
}

impl Source {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
        dataset: Dataset,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            dataset,
            filters: Vec::new(),
            cleaners: Vec::new(),
            skip_global: false,
        }
    }

    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn with_cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaners.push(Box::new(cleaner));
        self
    }

    pub fn skip_global(mut self, skip: bool) -> Self {
        self.skip_global = skip;
        self
    }

    /// The column filters and cleaners operate on
    ///
    /// # Errors
    /// Fails when `columns` is empty.
    pub fn subject_column(&self) -> Result<&str> {
        self.columns
            .first()
            .map(String::as_str)
            .ok_or_else(|| eyre!("Source '{}' has no columns", self.name))
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("rows", &self.dataset.len())
            .field(
                "filters",
                &self.filters.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field(
                "cleaners",
                &self.cleaners.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("skip_global", &self.skip_global)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_column_is_first() {
        let source = Source::new("web", ["text", "url"], Dataset::new());
        assert_eq!(source.subject_column().unwrap(), "text");
    }

    #[test]
    fn test_empty_columns_fail_on_access() {
        let source = Source::new("web", Vec::<String>::new(), Dataset::new());
        let err = source.subject_column().unwrap_err();
        assert!(err.to_string().contains("'web'"));
    }
}
