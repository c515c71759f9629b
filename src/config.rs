//! Pipeline configuration.
//!
//! Configuration comes from an optional YAML file, then from environment
//! variables, then from CLI flags, each layer overriding the one before.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ids::IdPrefixes;

pub const INPUT_DIR_ENV: &str = "RECIPE_ETL_INPUT_DIR";
pub const OUTPUT_DIR_ENV: &str = "RECIPE_ETL_OUTPUT_DIR";

/// Where the pipeline reads raw exports and writes its tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the exported source files
    pub input_dir: PathBuf,

    /// Recipe export file name within `input_dir`
    pub recipes_file: String,

    /// Interaction export file name within `input_dir`
    pub interactions_file: String,

    /// Directory the CSV tables are written to
    pub output_dir: PathBuf,

    /// Report file name within `output_dir`
    pub report_file: String,

    pub id_prefixes: IdPrefixes,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            recipes_file: "recipes.json".to_string(),
            interactions_file: "user_interactions.json".to_string(),
            output_dir: PathBuf::from("data/output"),
            report_file: "validation_report.json".to_string(),
            id_prefixes: IdPrefixes::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    ///
    /// Fields absent from the file keep their defaults.
    ///
    /// # Arguments
    /// * `path` - Path to the YAML config
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid YAML
    ///
    /// # Example
    /// ```ignore
    /// use recipe_etl::PipelineConfig;
    ///
    /// let config = PipelineConfig::load_from_file("config/pipeline.yaml")?;
    /// println!("Reading from {}", config.input_dir.display());
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text. An empty document gives the defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| format!("Failed to parse YAML: {}", e))
    }

    /// Override directories from `RECIPE_ETL_INPUT_DIR` / `RECIPE_ETL_OUTPUT_DIR`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(INPUT_DIR_ENV) {
            self.input_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn recipes_path(&self) -> PathBuf {
        self.input_dir.join(&self.recipes_file)
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.input_dir.join(&self.interactions_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }
}
