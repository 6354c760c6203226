//! Per-run configuration

use super::{Cleaner, GlobalFilter};
use crate::dataset::NumProc;
use serde::{Deserialize, Serialize};

/// What the global stage does with `global_cleaners`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalCleaning {
    /// Global cleaners are accepted but never run
    #[default]
    Inert,
    /// Global cleaners rewrite the global column of the union, before the
    /// global filters when `globals_first` is set and after them otherwise
    Applied,
}

/// Options for a single [`Pipeline::run`](super::Pipeline::run)
///
/// Build a fresh value for each run; nothing here is shared between runs.
///
/// # Example
/// ```
/// use corpus_pipeline::dataset::NumProc;
/// use corpus_pipeline::etl::RunOptions;
///
/// let options = RunOptions::default()
///     .cleaning_first(true)
///     .dry_run(true)
///     .num_proc(NumProc::single());
/// assert!(options.global_filters.is_empty());
/// ```
pub struct RunOptions {
    /// Filters over the union of all participating sources
    pub global_filters: Vec<Box<dyn GlobalFilter>>,
    /// Cleaners over the union; see [`GlobalCleaning`]
    pub global_cleaners: Vec<Box<dyn Cleaner>>,
    /// Run each source's cleaners before its filters
    pub cleaning_first: bool,
    /// Run global cleaners before global filters (only with `GlobalCleaning::Applied`)
    pub globals_first: bool,
    /// Annotate rows with `<filter>_criteria` instead of dropping them
    pub dry_run: bool,
    pub num_proc: NumProc,
    pub global_cleaning: GlobalCleaning,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            global_filters: Vec::new(),
            global_cleaners: Vec::new(),
            cleaning_first: false,
            globals_first: false,
            dry_run: false,
            num_proc: NumProc::default(),
            global_cleaning: GlobalCleaning::default(),
        }
    }
}

impl RunOptions {
    pub fn with_global_filter(mut self, filter: impl GlobalFilter + 'static) -> Self {
        self.global_filters.push(Box::new(filter));
        self
    }

    pub fn with_global_cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.global_cleaners.push(Box::new(cleaner));
        self
    }

    pub fn cleaning_first(mut self, enabled: bool) -> Self {
        self.cleaning_first = enabled;
        self
    }

    pub fn globals_first(mut self, enabled: bool) -> Self {
        self.globals_first = enabled;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn num_proc(mut self, num_proc: NumProc) -> Self {
        self.num_proc = num_proc;
        self
    }

    pub fn global_cleaning(mut self, mode: GlobalCleaning) -> Self {
        self.global_cleaning = mode;
        self
    }
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field(
                "global_filters",
                &self.global_filters.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field(
                "global_cleaners",
                &self.global_cleaners.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("cleaning_first", &self.cleaning_first)
            .field("globals_first", &self.globals_first)
            .field("dry_run", &self.dry_run)
            .field("num_proc", &self.num_proc)
            .field("global_cleaning", &self.global_cleaning)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::default();
        assert!(options.global_filters.is_empty());
        assert!(options.global_cleaners.is_empty());
        assert!(!options.cleaning_first);
        assert!(!options.globals_first);
        assert!(!options.dry_run);
        assert_eq!(options.num_proc, NumProc::available());
        assert_eq!(options.global_cleaning, GlobalCleaning::Inert);
    }

    #[test]
    fn test_global_cleaning_yaml() {
        let mode: GlobalCleaning = serde_yaml::from_str("applied").unwrap();
        assert_eq!(mode, GlobalCleaning::Applied);
        assert_eq!(serde_yaml::to_string(&GlobalCleaning::Inert).unwrap().trim(), "inert");
    }
}
