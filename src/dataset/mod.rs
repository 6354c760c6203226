//! In-memory columnar dataset
//!
//! A `Dataset` is an ordered collection of rows sharing a column schema.
//! Every operation returns a new dataset and leaves the receiver untouched,
//! so callers rebind rather than mutate.

mod workers;

pub use workers::NumProc;

use eyre::{Result, bail, eyre};
use serde_json::Value;
use workers::par_rows;

/// A single example: column name to value
pub type Row = serde_json::Map<String, Value>;

/// Direction of a concatenation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Stack datasets end to end; columns missing from one side are null
    Rows,
    /// Join side by side; row counts must match and names must not clash
    Columns,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Create an empty dataset with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from rows
    ///
    /// The schema is every column seen, in first-seen order. Rows missing
    /// a column get `null` for it.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                for column in &columns {
                    row.entry(column.clone()).or_insert(Value::Null);
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// Build a dataset from JSON values, each of which must be an object
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Value::Object(row) => Ok(row),
                other => Err(eyre!("Row {} is not a JSON object: {}", i, other)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_rows(rows))
    }

    /// Build a dataset from a column name to values mapping
    ///
    /// # Errors
    /// Fails when columns have different lengths or a name repeats.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut dataset: Option<Dataset> = None;
        for (name, values) in columns {
            dataset = Some(match dataset {
                None => Self::single_column(name.into(), values),
                Some(existing) => existing.with_new_column(name.into(), values)?,
            });
        }
        Ok(dataset.unwrap_or_default())
    }

    fn single_column(name: String, values: Vec<Value>) -> Self {
        let rows = values
            .into_iter()
            .map(|value| {
                let mut row = Row::new();
                row.insert(name.clone(), value);
                row
            })
            .collect();
        Self {
            columns: vec![name],
            rows,
        }
    }

    fn with_new_column(self, name: String, values: Vec<Value>) -> Result<Self> {
        if self.columns.contains(&name) {
            bail!("Duplicate column '{}'", name);
        }
        self.with_column(name, values)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in schema order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        if !self.has_column(name) {
            bail!("Dataset has no column '{}'", name);
        }
        Ok(self.rows.iter().filter_map(|row| row.get(name)).collect())
    }

    /// Add a column, or overwrite it if it already exists
    pub fn with_column(&self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.rows.len() {
            bail!(
                "Column '{}' has {} values but the dataset has {} rows",
                name,
                values.len(),
                self.rows.len()
            );
        }

        let mut columns = self.columns.clone();
        if !columns.contains(&name) {
            columns.push(name.clone());
        }
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut row = row.clone();
                row.insert(name.clone(), value);
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Drop a column; a missing column is not an error
    pub fn without_column(&self, name: &str) -> Self {
        let columns = self.columns.iter().filter(|c| *c != name).cloned().collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.remove(name);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Keep the rows at `indices`, in the order given
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        let rows = indices
            .iter()
            .map(|&i| {
                self.rows.get(i).cloned().ok_or_else(|| {
                    eyre!("Row index {} out of range for {} rows", i, self.rows.len())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Apply a per-row update to every row
    ///
    /// `f` returns the columns to set on that row; they overwrite existing
    /// values or extend the schema. Row count and order are preserved.
    pub fn map<F>(&self, f: F, num_proc: NumProc) -> Result<Self>
    where
        F: Fn(&Row) -> Result<Row> + Send + Sync,
    {
        let updates = par_rows(&self.rows, num_proc, f)?;

        let mut columns = self.columns.clone();
        let rows = self
            .rows
            .iter()
            .zip(updates)
            .map(|(row, update)| {
                let mut row = row.clone();
                for (key, value) in update {
                    if !columns.contains(&key) {
                        columns.push(key.clone());
                    }
                    row.insert(key, value);
                }
                row
            })
            .collect::<Vec<_>>();

        // A column introduced by only some rows is null elsewhere
        let rows = rows
            .into_iter()
            .map(|mut row| {
                for column in &columns {
                    row.entry(column.clone()).or_insert(Value::Null);
                }
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Keep the rows for which `predicate` is true, in their original order
    pub fn filter<F>(&self, predicate: F, num_proc: NumProc) -> Result<Self>
    where
        F: Fn(&Row) -> Result<bool> + Send + Sync,
    {
        let keep = par_rows(&self.rows, num_proc, predicate)?;
        let rows = self
            .rows
            .iter()
            .zip(keep)
            .filter_map(|(row, keep)| keep.then(|| row.clone()))
            .collect();
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }
}

/// Concatenate datasets along `axis`
///
/// With [`Axis::Rows`] the result carries every column in first-seen order,
/// and rows lacking one get `null`.
pub fn concatenate(datasets: &[&Dataset], axis: Axis) -> Result<Dataset> {
    match axis {
        Axis::Rows => concat_rows(datasets),
        Axis::Columns => concat_columns(datasets),
    }
}

fn concat_rows(datasets: &[&Dataset]) -> Result<Dataset> {
    let mut columns: Vec<String> = Vec::new();
    for column in datasets.iter().flat_map(|d| d.columns.iter()) {
        if !columns.contains(column) {
            columns.push(column.clone());
        }
    }

    let rows = datasets
        .iter()
        .flat_map(|d| d.rows.iter())
        .map(|row| {
            let mut row = row.clone();
            for column in &columns {
                row.entry(column.as_str()).or_insert(Value::Null);
            }
            row
        })
        .collect();

    Ok(Dataset { columns, rows })
}

fn concat_columns(datasets: &[&Dataset]) -> Result<Dataset> {
    let Some(first) = datasets.first() else {
        return Ok(Dataset::new());
    };

    let mut columns = first.columns.clone();
    for other in &datasets[1..] {
        if other.rows.len() != first.rows.len() {
            bail!(
                "Cannot join datasets with different row counts: {} vs {}",
                first.rows.len(),
                other.rows.len()
            );
        }
        for column in &other.columns {
            if columns.contains(column) {
                bail!("Cannot join datasets: column '{}' appears twice", column);
            }
            columns.push(column.clone());
        }
    }

    let rows = (0..first.rows.len())
        .map(|i| {
            let mut row = Row::new();
            for dataset in datasets {
                row.extend(dataset.rows[i].iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            row
        })
        .collect();

    Ok(Dataset { columns, rows })
}
