//! NDJSON (Newline Delimited JSON) file operations

use crate::dataset::{Dataset, Row};
use crate::etl::{Extractor, Loader};

use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::path::Path;

/// Read examples from an NDJSON file, one JSON object per line
pub struct NdjsonReader {
    path: std::path::PathBuf,
}

impl NdjsonReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all non-blank lines as rows
    pub fn read(&self) -> Result<Vec<Row>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read NDJSON file: {}", self.path.display()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                let value: Value = serde_json::from_str(line).with_context(|| {
                    format!("Failed to parse JSON on line {} of {}", n + 1, self.path.display())
                })?;
                match value {
                    Value::Object(row) => Ok(row),
                    _ => Err(eyre!(
                        "Line {} of {} is not a JSON object",
                        n + 1,
                        self.path.display()
                    )),
                }
            })
            .collect()
    }

    /// Read the file into a dataset
    pub fn read_dataset(&self) -> Result<Dataset> {
        Ok(Dataset::from_rows(self.read()?))
    }
}

impl Extractor for NdjsonReader {
    type Item = Row;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        self.read()
    }
}

/// Write rows to an NDJSON file
pub struct NdjsonWriter {
    path: std::path::PathBuf,
}

impl NdjsonWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write rows as NDJSON, replacing the file
    pub fn write(&self, rows: &[Row]) -> Result<()> {
        let ndjson = rows
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
            .join("\n");

        // Add trailing newline
        let content = if ndjson.is_empty() {
            String::new()
        } else {
            format!("{}\n", ndjson)
        };

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write NDJSON file: {}", self.path.display()))?;

        Ok(())
    }
}

impl Loader for NdjsonWriter {
    type Item = Row;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.write(&items)?;
        Ok(items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(row) => row,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_read_write() {
        let temp = NamedTempFile::new().unwrap();
        let writer = NdjsonWriter::new(temp.path());

        let data = vec![row(json!({"text": "a"})), row(json!({"text": "b"}))];
        writer.write(&data).unwrap();

        let reader = NdjsonReader::new(temp.path());
        assert_eq!(reader.read().unwrap(), data);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "{\"text\":\"a\"}\n\n   \n{\"text\":\"b\"}\n").unwrap();

        assert_eq!(NdjsonReader::new(temp.path()).read().unwrap().len(), 2);
    }

    #[test]
    fn test_non_object_line_rejected() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "{\"text\":\"a\"}\n[1, 2]\n").unwrap();

        let err = NdjsonReader::new(temp.path()).read().unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_empty_write() {
        let temp = NamedTempFile::new().unwrap();
        NdjsonWriter::new(temp.path()).write(&[]).unwrap();

        assert_eq!(std::fs::read_to_string(temp.path()).unwrap(), "");
    }
}
