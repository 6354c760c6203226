//! Resolve manifest transform references to built-in transforms

use super::{ExactDedup, Lowercase, MaxLength, MinLength, NonEmpty, NormalizeWhitespace, Uppercase};
use crate::etl::{Cleaner, Filter, GlobalFilter};
use crate::manifest::TransformSpec;
use eyre::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Names accepted by [`build_filter`]
pub const FILTERS: &[&str] = &["min_length", "max_length", "non_empty"];
/// Names accepted by [`build_cleaner`]
pub const CLEANERS: &[&str] = &["normalize_whitespace", "lowercase", "uppercase"];
/// Names accepted by [`build_global_filter`]
pub const GLOBAL_FILTERS: &[&str] = &["exact_dedup"];

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MinParams {
    min: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MaxParams {
    max: usize,
}

fn params<T: DeserializeOwned>(name: &str, params: serde_yaml::Value) -> Result<T> {
    if params.is_null() {
        bail!("Transform '{}' requires parameters", name);
    }
    serde_yaml::from_value(params).with_context(|| format!("Invalid parameters for '{}'", name))
}

fn no_params(name: &str, params: &serde_yaml::Value) -> Result<()> {
    if !params.is_null() {
        bail!("Transform '{}' takes no parameters", name);
    }
    Ok(())
}

/// Build a per-example filter
pub fn build_filter(spec: &TransformSpec) -> Result<Box<dyn Filter>> {
    let (name, raw) = spec.parts()?;
    let filter: Box<dyn Filter> = match name {
        "min_length" => Box::new(MinLength::new(params::<MinParams>(name, raw)?.min)),
        "max_length" => Box::new(MaxLength::new(params::<MaxParams>(name, raw)?.max)),
        "non_empty" => {
            no_params(name, &raw)?;
            Box::new(NonEmpty)
        }
        other => bail!("Unknown filter '{}' (available: {})", other, FILTERS.join(", ")),
    };
    Ok(filter)
}

/// Build a per-example cleaner
pub fn build_cleaner(spec: &TransformSpec) -> Result<Box<dyn Cleaner>> {
    let (name, raw) = spec.parts()?;
    no_params(name, &raw)?;
    let cleaner: Box<dyn Cleaner> = match name {
        "normalize_whitespace" => Box::new(NormalizeWhitespace::new()?),
        "lowercase" => Box::new(Lowercase),
        "uppercase" => Box::new(Uppercase),
        other => bail!("Unknown cleaner '{}' (available: {})", other, CLEANERS.join(", ")),
    };
    Ok(cleaner)
}

/// Build a global filter
pub fn build_global_filter(spec: &TransformSpec) -> Result<Box<dyn GlobalFilter>> {
    let (name, raw) = spec.parts()?;
    no_params(name, &raw)?;
    let filter: Box<dyn GlobalFilter> = match name {
        "exact_dedup" => Box::new(ExactDedup),
        other => bail!(
            "Unknown global filter '{}' (available: {})",
            other,
            GLOBAL_FILTERS.join(", ")
        ),
    };
    Ok(filter)
}
