//! Pipeline manifest
//!
//! A manifest describes the sources of a run, their transforms and the run
//! options. Transforms are referenced by registry name, either bare or as a
//! single-key map carrying parameters.
//!
//! Example format:
//! ```yaml
//! options:
//!   cleaning_first: false
//!   dry_run: false
//!   num_proc: 4
//!   global_cleaning: inert
//! global_filters:
//!   - exact_dedup
//! sources:
//!   - name: web
//!     path: data/web.ndjson
//!     columns: [text]
//!     filters:
//!       - min_length: { min: 10 }
//!     cleaners:
//!       - normalize_whitespace
//!   - name: books
//!     path: data/books.ndjson
//!     columns: [text]
//!     skip_global: true
//! ```

use crate::etl::GlobalCleaning;
use eyre::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Reference to a registered transform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TransformSpec {
    /// `- normalize_whitespace`
    Name(String),
    /// `- min_length: { min: 10 }`
    WithParams(BTreeMap<String, serde_yaml::Value>),
}

impl TransformSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Transform name and its parameters (`null` when none were given)
    ///
    /// # Errors
    /// Fails when a parameter map does not have exactly one key.
    pub fn parts(&self) -> Result<(&str, serde_yaml::Value)> {
        match self {
            Self::Name(name) => Ok((name.as_str(), serde_yaml::Value::Null)),
            Self::WithParams(map) => {
                let mut entries = map.iter();
                match (entries.next(), entries.next()) {
                    (Some((name, params)), None) => Ok((name.as_str(), params.clone())),
                    _ => bail!(
                        "Transform entry must have exactly one name, found: {:?}",
                        map.keys().collect::<Vec<_>>()
                    ),
                }
            }
        }
    }
}

/// Run options as written in the manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ManifestOptions {
    pub cleaning_first: bool,
    pub globals_first: bool,
    pub dry_run: bool,
    /// Worker count; defaults to the host's available parallelism
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_proc: Option<usize>,
    pub global_cleaning: GlobalCleaning,
}

/// One data source in the manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceEntry {
    pub name: String,
    /// NDJSON file, relative paths resolve against the manifest directory
    pub path: PathBuf,
    pub columns: Vec<String>,
    #[serde(default)]
    pub skip_global: bool,
    #[serde(default)]
    pub filters: Vec<TransformSpec>,
    #[serde(default)]
    pub cleaners: Vec<TransformSpec>,
}

/// Pipeline manifest structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PipelineManifest {
    #[serde(default)]
    pub options: ManifestOptions,
    #[serde(default)]
    pub global_filters: Vec<TransformSpec>,
    #[serde(default)]
    pub global_cleaners: Vec<TransformSpec>,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    /// Directory the manifest was read from
    #[serde(skip)]
    base_dir: PathBuf,
}

impl PipelineManifest {
    /// Parse a manifest from YAML; relative paths resolve against the
    /// current directory
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse pipeline manifest")
    }

    /// Read a manifest file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let mut manifest: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Location of a source's data file
    pub fn source_path(&self, source: &SourceEntry) -> PathBuf {
        if source.path.is_absolute() {
            source.path.clone()
        } else {
            self.base_dir.join(&source.path)
        }
    }

    pub fn count(&self) -> usize {
        self.sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
options:
  cleaning_first: true
  num_proc: 2
  global_cleaning: applied
global_filters:
  - exact_dedup
sources:
  - name: web
    path: web.ndjson
    columns: [text, url]
    filters:
      - min_length: { min: 10 }
      - non_empty
    cleaners:
      - lowercase
  - name: books
    path: /data/books.ndjson
    columns: [text]
    skip_global: true
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = PipelineManifest::from_yaml_str(MANIFEST).unwrap();

        assert!(manifest.options.cleaning_first);
        assert!(!manifest.options.dry_run);
        assert_eq!(manifest.options.num_proc, Some(2));
        assert_eq!(manifest.options.global_cleaning, GlobalCleaning::Applied);
        assert_eq!(manifest.global_filters, [TransformSpec::named("exact_dedup")]);
        assert!(manifest.global_cleaners.is_empty());
        assert_eq!(manifest.count(), 2);

        let web = &manifest.sources[0];
        assert_eq!(web.columns, ["text", "url"]);
        assert!(!web.skip_global);
        let (name, params) = web.filters[0].parts().unwrap();
        assert_eq!(name, "min_length");
        assert_eq!(params["min"].as_u64(), Some(10));
        assert_eq!(web.filters[1].parts().unwrap().0, "non_empty");

        assert!(manifest.sources[1].skip_global);
    }

    #[test]
    fn test_defaults() {
        let manifest = PipelineManifest::from_yaml_str("sources: []").unwrap();
        assert_eq!(manifest.options, ManifestOptions::default());
        assert_eq!(manifest.options.global_cleaning, GlobalCleaning::Inert);
    }

    #[test]
    fn test_multi_key_transform_rejected() {
        let spec: TransformSpec = serde_yaml::from_str("{ a: 1, b: 2 }").unwrap();
        assert!(spec.parts().is_err());
    }

    #[test]
    fn test_source_paths_resolve_against_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pipeline.yml");
        std::fs::write(&path, MANIFEST).unwrap();

        let manifest = PipelineManifest::read(&path).unwrap();
        assert_eq!(
            manifest.source_path(&manifest.sources[0]),
            temp.path().join("web.ndjson")
        );
        assert_eq!(
            manifest.source_path(&manifest.sources[1]),
            PathBuf::from("/data/books.ndjson")
        );
    }
}
