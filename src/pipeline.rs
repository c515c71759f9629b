//! End-to-end pipeline: raw batch in, canonical tables and a validation
//! report out.
//!
//! # Example Flow
//! 1. Load a [`RawBatch`] from the exporter's files
//! 2. Build rows with the recipe and interaction builders
//! 3. Assemble the four canonical tables (duplicate recipes dropped)
//! 4. Write the tables to a [`TableSink`]
//! 5. Read them back and validate every row

use tracing::{debug, info};

use crate::assembler::{CanonicalTables, TableAssembler};
use crate::builders::{EntityBuilder, InteractionBuilder, RecipeBuilder};
use crate::config::PipelineConfig;
use crate::ids::{IdGenerator, RandomIdGenerator};
use crate::serialization::{SinkError, TableSink};
use crate::source::RawBatch;
use crate::validator::{ValidationReport, Validator};

/// Normalization and validation pipeline.
///
/// Owns the id generator, so one pipeline never issues the same generated
/// id twice.
pub struct Pipeline<G: IdGenerator = RandomIdGenerator> {
    ids: G,
    recipes: RecipeBuilder,
    interactions: InteractionBuilder,
    validator: Validator,
}

impl Pipeline<RandomIdGenerator> {
    /// Pipeline with random generated ids.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_id_generator(config, RandomIdGenerator::new())
    }
}

impl<G: IdGenerator> Pipeline<G> {
    /// Pipeline drawing generated ids from `ids`.
    ///
    /// # Example
    /// ```ignore
    /// use recipe_etl::{Pipeline, PipelineConfig, SequentialIdGenerator};
    ///
    /// let mut pipeline = Pipeline::with_id_generator(PipelineConfig::default(), SequentialIdGenerator::new());
    /// let tables = pipeline.normalize(&batch);
    /// ```
    pub fn with_id_generator(config: PipelineConfig, ids: G) -> Self {
        let recipes = RecipeBuilder::new(config.id_prefixes.clone());
        let interactions = InteractionBuilder::new(config.id_prefixes.clone());
        Self {
            ids,
            recipes,
            interactions,
            validator: Validator::new(),
        }
    }

    /// Build and assemble the canonical tables for `batch`.
    pub fn normalize(&mut self, batch: &RawBatch) -> CanonicalTables {
        let mut assembler = TableAssembler::new();

        for record in &batch.recipes {
            let bundle = self.recipes.build(record, &mut self.ids);
            debug!(
                "Built {} '{}' with {} ingredients, {} steps",
                self.recipes.name(),
                bundle.recipe.recipe_id,
                bundle.ingredients.len(),
                bundle.steps.len()
            );
            assembler.push_recipe(bundle);
        }

        for record in &batch.interactions {
            let interaction = self.interactions.build(record, &mut self.ids);
            debug!(
                "Built {} '{}'",
                self.interactions.name(),
                interaction.interaction_id
            );
            assembler.push_interaction(interaction);
        }

        assembler.finish()
    }

    /// Normalize `batch`, write the tables to `sink`, then validate what the
    /// sink holds.
    ///
    /// # Errors
    /// Returns error only if the sink can't store a table.
    pub fn run(
        &mut self,
        batch: &RawBatch,
        sink: &mut dyn TableSink,
    ) -> Result<ValidationReport, SinkError> {
        let tables = self.normalize(batch);
        sink.write_tables(&tables)?;

        let report = self.validator.validate_sink(sink);
        info!(
            "Pipeline finished: {} valid rows, {} invalid rows",
            report.valid_count(),
            report.invalid_count()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use crate::serialization::MemorySink;
    use serde_json::json;

    fn pipeline() -> Pipeline<SequentialIdGenerator> {
        Pipeline::with_id_generator(PipelineConfig::default(), SequentialIdGenerator::new())
    }

    #[test]
    fn test_normalize_drops_duplicate_recipes() {
        let batch = RawBatch::new(
            vec![
                json!({"id": "R1", "title": "Tea", "steps": "Boil. Pour."}),
                json!({"id": "R1", "title": "Tea copy", "steps": "Other."}),
            ],
            Vec::new(),
        );

        let tables = pipeline().normalize(&batch);
        assert_eq!(tables.recipes.len(), 1);
        assert_eq!(tables.steps.len(), 2);
    }

    #[test]
    fn test_run_validates_what_the_sink_holds() {
        let batch = RawBatch::new(
            vec![json!({"id": "R1", "title": "Tea"})],
            vec![json!({"user": "U1", "recipe": "R1", "type": "cook", "score": 6})],
        );
        let mut sink = MemorySink::new();

        let report = pipeline().run(&batch, &mut sink).unwrap();

        assert_eq!(report.get("recipes").unwrap().valid.len(), 1);
        let interactions = report.get("interactions").unwrap();
        assert_eq!(interactions.invalid.len(), 1);
        assert_eq!(interactions.invalid[0].errors, vec!["rating must be between 1 and 5"]);
        assert_eq!(interactions.invalid[0].record["interaction_id"], "I_00000001");
    }

    #[test]
    fn test_configured_prefixes() {
        let mut config = PipelineConfig::default();
        config.id_prefixes.recipe = "RCP".to_string();
        config.id_prefixes.interaction = "INT".to_string();
        let mut pipeline = Pipeline::with_id_generator(config, SequentialIdGenerator::new());

        let tables = pipeline.normalize(&RawBatch::new(
            vec![json!({"name": "Soup"})],
            vec![json!({"user": "U1", "recipe": "R1", "type": "view"})],
        ));
        assert_eq!(tables.recipes.records()[0]["recipe_id"], "RCP_00000001");
        assert_eq!(tables.interactions.records()[0]["interaction_id"], "INT_00000002");
    }
}
