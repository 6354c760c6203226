//! Loader trait for writing cleaned examples to a destination

use eyre::Result;

/// Loader trait for writing items to a destination
///
/// Implementors define where cleaned data ends up:
/// - A single NDJSON file
/// - One NDJSON file per source in an output directory
///
/// # Example
/// ```no_run
/// use corpus_pipeline::dataset::Row;
/// use corpus_pipeline::etl::Loader;
/// use eyre::Result;
///
/// struct Discard;
///
/// impl Loader for Discard {
///     type Item = Row;
///
///     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// Load items to the destination
    ///
    /// Returns the number of items successfully loaded
    ///
    /// # Errors
    /// Returns an error if loading fails (I/O, serialization, etc.)
    fn load(
        &self,
        items: Vec<Self::Item>,
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}
