//! # recipe-etl: Recipe Normalization and Validation
//!
//! Turns loosely-structured recipe and interaction documents exported from a
//! document store into four fixed-schema tables, then validates every row.
//!
//! ## Features
//!
//! - **Fallback field resolution**: each canonical field is read from an ordered list of candidate keys
//! - **Ingredient parsing**: structured mappings and free text (`"1 1/2 cups flour"`) normalize to quantity, unit and name
//! - **Timestamp normalization**: RFC 3339, textual dates, epoch values and document-store timestamp objects become ISO-8601
//! - **Table assembly**: recipes, ingredients, steps and interactions in a fixed column order, duplicate recipes dropped
//! - **Validation**: every row is classified valid or invalid with readable violations
//!
//! ## Example
//!
//! ```
//! use recipe_etl::{MemorySink, Pipeline, PipelineConfig, RawBatch, SequentialIdGenerator};
//! use serde_json::json;
//!
//! let batch = RawBatch::new(
//!     vec![json!({"id": "R1", "title": "Tea", "ingredients": "Water, 1 tsp Sugar"})],
//!     vec![json!({"user": "U1", "recipe": "R1", "type": "view"})],
//! );
//!
//! let mut pipeline = Pipeline::with_id_generator(PipelineConfig::default(), SequentialIdGenerator::new());
//! let mut sink = MemorySink::new();
//! let report = pipeline.run(&batch, &mut sink).unwrap();
//!
//! assert_eq!(report.get("ingredients").unwrap().valid.len(), 2);
//! assert_eq!(report.invalid_count(), 0);
//! ```

// Core modules
pub mod entity;
pub mod models;
pub mod extraction;
pub mod timestamp;
pub mod ingredient;
pub mod ids;

// Rows from raw records
pub mod builders;
pub mod assembler;

// Sinks and validation
pub mod serialization;
pub mod validator;

// Running the pipeline
pub mod config;
pub mod source;
pub mod pipeline;

// Re-export key types
pub use entity::{Entity, FieldValue, Violation};
pub use models::{IngredientLine, Interaction, Recipe, Step};
pub use extraction::{resolve, Extractor};
pub use ingredient::{IngredientEntry, ParsedIngredient};
pub use ids::{IdGenerator, IdPrefixes, RandomIdGenerator, SequentialIdGenerator};
pub use builders::{EntityBuilder, InteractionBuilder, RecipeBuilder, RecipeBundle};
pub use assembler::{CanonicalTables, Record, Table, TableAssembler};
pub use serialization::{CsvDirSink, MemorySink, SinkError, TableSink};
pub use validator::{EntityReport, InvalidRow, RowStatus, ValidationReport, Validator};
pub use config::PipelineConfig;
pub use source::{RawBatch, SourceError};
pub use pipeline::Pipeline;
