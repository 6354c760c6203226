//! Output directory holding one NDJSON file per source

use super::NdjsonWriter;
use crate::dataset::Dataset;
use crate::etl::Loader;
use eyre::{Context, Result, bail};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Writes each source's dataset to `<dir>/<source-name>.ndjson`
pub struct OutputDirectory {
    path: PathBuf,
}

impl OutputDirectory {
    /// Open (and create if needed) the output directory
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create output directory: {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name a source's output is written under
    pub fn file_name(source_name: &str) -> String {
        format!("{}.ndjson", sanitize(source_name))
    }

    /// Path a source's output is written to
    pub fn file_for(&self, source_name: &str) -> PathBuf {
        self.path.join(Self::file_name(source_name))
    }

    /// Fail if two source names map to the same output file
    pub fn ensure_distinct<'a>(source_names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let mut claimed: HashMap<String, &str> = HashMap::new();
        for name in source_names {
            let file = Self::file_name(name);
            if let Some(previous) = claimed.get(&file) {
                bail!(
                    "Sources '{}' and '{}' would both be written to {}",
                    previous,
                    name,
                    file
                );
            }
            claimed.insert(file, name);
        }
        Ok(())
    }

    /// Write one source's dataset, replacing any previous output
    pub fn write_source(&self, source_name: &str, dataset: &Dataset) -> Result<PathBuf> {
        let path = self.file_for(source_name);
        NdjsonWriter::new(&path).write(dataset.rows())?;
        log::debug!("Wrote {} row(s) to {}", dataset.len(), path.display());
        Ok(path)
    }

    /// Remove all NDJSON files from the directory
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        for entry in std::fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("ndjson") {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }

        Ok(())
    }
}

/// Keep file names portable: anything but alphanumerics, `-`, `_` and `.` becomes `_`
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl Loader for OutputDirectory {
    /// Source name and its final dataset
    type Item = (String, Dataset);

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        for (name, dataset) in &items {
            self.write_source(name, dataset)?;
        }
        Ok(items.len())
    }
}
