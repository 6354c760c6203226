//! Worker-count hint and the row-parallel executor behind `Dataset::map`/`filter`

use super::Row;
use eyre::{Context, Result, bail, eyre};
use rayon::ThreadPool;
use rayon::prelude::*;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

/// Number of worker threads a dataset operation may use
///
/// Only a performance knob: results are identical and in the same order
/// for every worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumProc(NonZeroUsize);

impl NumProc {
    /// Create a worker count, rejecting zero
    pub fn new(count: usize) -> Result<Self> {
        match NonZeroUsize::new(count) {
            Some(n) => Ok(Self(n)),
            None => bail!("Worker count must be a positive integer, got 0"),
        }
    }

    /// Single-threaded execution
    pub fn single() -> Self {
        Self(NonZeroUsize::MIN)
    }

    /// The host's available parallelism, falling back to one worker
    pub fn available() -> Self {
        Self(std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for NumProc {
    fn default() -> Self {
        Self::available()
    }
}

impl FromStr for NumProc {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        let count: usize = s
            .trim()
            .parse()
            .with_context(|| format!("Invalid worker count: {}", s))?;
        Self::new(count)
    }
}

impl std::fmt::Display for NumProc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Apply `f` to every row, returning results in row order
///
/// Runs inline for one worker (or fewer than two rows), otherwise on the
/// shared rayon pool sized by `num_proc`. The first error aborts.
pub(crate) fn par_rows<T, F>(rows: &[Row], num_proc: NumProc, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Row) -> Result<T> + Send + Sync,
{
    if num_proc.get() == 1 || rows.len() < 2 {
        return rows.iter().map(f).collect();
    }

    pool_for(num_proc)?.install(|| rows.par_iter().map(f).collect())
}

/// Worker pool for `num_proc`, built on first use and reused afterwards
fn pool_for(num_proc: NumProc) -> Result<Arc<ThreadPool>> {
    static POOLS: OnceLock<Mutex<HashMap<NumProc, Arc<ThreadPool>>>> = OnceLock::new();

    let mut pools = POOLS
        .get_or_init(Default::default)
        .lock()
        .map_err(|_| eyre!("Worker pool cache is poisoned"))?;
    if let Some(pool) = pools.get(&num_proc) {
        return Ok(Arc::clone(pool));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_proc.get())
        .build()
        .context("Failed to build worker pool")?;
    log::debug!("Started worker pool with {} thread(s)", num_proc);
    let pool = Arc::new(pool);
    pools.insert(num_proc, Arc::clone(&pool));
    Ok(pool)
}
