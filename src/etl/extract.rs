//! Extractor trait for reading examples from a source

use eyre::Result;

/// Extractor trait for pulling raw examples out of a source
///
/// Implementors define where the examples of one data source come from:
/// - NDJSON files
/// - In-memory fixtures
///
/// # Example
/// ```no_run
/// use corpus_pipeline::dataset::Row;
/// use corpus_pipeline::etl::Extractor;
/// use eyre::Result;
///
/// struct Fixture {
///     rows: Vec<Row>,
/// }
///
/// impl Extractor for Fixture {
///     type Item = Row;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         Ok(self.rows.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (I/O, parsing, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
