//! Entity builders: raw records in, canonical rows out.
//!
//! Builders resolve fields through the candidate-key lists, normalize
//! timestamps, parse ingredients, and generate ids where the source has none.
//! They return rows; the [`TableAssembler`](crate::assembler::TableAssembler)
//! owns the tables.

pub mod interaction;
pub mod recipe;

pub use interaction::InteractionBuilder;
pub use recipe::{RecipeBuilder, RecipeBundle};

use serde_json::Value;

use crate::ids::IdGenerator;

/// Trait for building canonical rows from one raw record.
///
/// Building is total: a record of any shape produces output, with missing
/// fields left empty for the validator to report.
pub trait EntityBuilder {
    /// What one raw record turns into
    type Output;

    /// Entity name, used in log lines
    fn name(&self) -> &'static str;

    /// Build rows from `record`, drawing fresh ids from `ids` where needed.
    fn build(&self, record: &Value, ids: &mut dyn IdGenerator) -> Self::Output;
}
