//! Raw source loading.
//!
//! The document-store exporter writes one JSON file per entity type. A file
//! may hold an array of documents, a single document, or one document per
//! line. A source that can't be read is logged and treated as empty so the
//! rest of the run still produces its tables.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::PipelineConfig;

/// Error reading a raw source file
#[derive(Debug)]
pub enum SourceError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    UnexpectedShape(&'static str),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::IoError(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::ParseError(err)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::IoError(e) => write!(f, "IO error: {}", e),
            SourceError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SourceError::UnexpectedShape(kind) => {
                write!(f, "expected an array or object of documents, found {}", kind)
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Raw records for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatch {
    pub recipes: Vec<Value>,
    pub interactions: Vec<Value>,
}

impl RawBatch {
    pub fn new(recipes: Vec<Value>, interactions: Vec<Value>) -> Self {
        Self {
            recipes,
            interactions,
        }
    }

    /// Load the configured export files.
    pub fn load(config: &PipelineConfig) -> Self {
        let batch = Self {
            recipes: load_records(&config.recipes_path()),
            interactions: load_records(&config.interactions_path()),
        };
        info!(
            "Loaded {} recipe documents, {} interaction documents",
            batch.recipes.len(),
            batch.interactions.len()
        );
        batch
    }
}

/// Records from `path`, or an empty sequence if the source is unavailable.
pub fn load_records(path: &Path) -> Vec<Value> {
    match read_records(path) {
        Ok(records) => records,
        Err(e) => {
            warn!("Source {} unavailable, using no records: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Read documents from a JSON array, single-object, or NDJSON file.
pub fn read_records(path: &Path) -> Result<Vec<Value>, SourceError> {
    let contents = fs::read_to_string(path)?;
    parse_records(&contents)
}

pub fn parse_records(contents: &str) -> Result<Vec<Value>, SourceError> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(document @ Value::Object(_)) => Ok(vec![document]),
        Ok(Value::Null) => Ok(Vec::new()),
        Ok(Value::String(_)) => Err(SourceError::UnexpectedShape("a string")),
        Ok(Value::Number(_)) => Err(SourceError::UnexpectedShape("a number")),
        Ok(Value::Bool(_)) => Err(SourceError::UnexpectedShape("a boolean")),
        // Not a single JSON value; try one document per line.
        Err(_) => contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str::<Value>(line).map_err(SourceError::from))
            .collect(),
    }
}
