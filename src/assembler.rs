//! Table assembly.
//!
//! The assembler exclusively owns the rows of a run. It drops duplicate
//! recipes and lays every row out in its table's canonical column order.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::builders::RecipeBundle;
use crate::entity::Entity;
use crate::models::{IngredientLine, Interaction, Recipe, Step};

/// A row keyed by column name, in column order.
pub type Record = IndexMap<String, String>;

/// A named table of string cells with a fixed column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with `E`'s name and columns.
    pub fn empty<E: Entity>() -> Self {
        Self {
            name: E::NAME.to_string(),
            columns: E::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_entities<E: Entity>(entities: &[E]) -> Self {
        let mut table = Self::empty::<E>();
        table.rows = entities.iter().map(E::cells).collect();
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as column-ordered records. Short rows are padded with empty cells.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| (column.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}

/// The four canonical tables of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTables {
    pub recipes: Table,
    pub ingredients: Table,
    pub steps: Table,
    pub interactions: Table,
}

impl CanonicalTables {
    /// Tables in sink order.
    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        [&self.recipes, &self.ingredients, &self.steps, &self.interactions].into_iter()
    }
}

impl Default for CanonicalTables {
    fn default() -> Self {
        Self {
            recipes: Table::empty::<Recipe>(),
            ingredients: Table::empty::<IngredientLine>(),
            steps: Table::empty::<Step>(),
            interactions: Table::empty::<Interaction>(),
        }
    }
}

/// Collects builder output for one run.
#[derive(Debug, Default)]
pub struct TableAssembler {
    recipes: Vec<Recipe>,
    ingredients: Vec<IngredientLine>,
    steps: Vec<Step>,
    interactions: Vec<Interaction>,
    seen_recipe_ids: HashSet<String>,
    dropped_recipes: usize,
}

impl TableAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe with its ingredient lines and steps.
    ///
    /// The first bundle for a `recipe_id` wins; a later bundle with the same
    /// id is dropped whole so its steps cannot collide with the kept ones.
    ///
    /// # Returns
    /// `true` if the bundle was kept
    pub fn push_recipe(&mut self, bundle: RecipeBundle) -> bool {
        if !self.seen_recipe_ids.insert(bundle.recipe.recipe_id.clone()) {
            warn!(
                "Dropping duplicate recipe '{}' ({} ingredients, {} steps)",
                bundle.recipe.recipe_id,
                bundle.ingredients.len(),
                bundle.steps.len()
            );
            self.dropped_recipes += 1;
            return false;
        }

        self.recipes.push(bundle.recipe);
        self.ingredients.extend(bundle.ingredients);
        self.steps.extend(bundle.steps);
        true
    }

    pub fn push_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    /// Number of recipe bundles dropped as duplicates so far.
    pub fn dropped_recipes(&self) -> usize {
        self.dropped_recipes
    }

    /// Lay out the four tables in canonical column order.
    pub fn finish(self) -> CanonicalTables {
        let tables = CanonicalTables {
            recipes: Table::from_entities(&self.recipes),
            ingredients: Table::from_entities(&self.ingredients),
            steps: Table::from_entities(&self.steps),
            interactions: Table::from_entities(&self.interactions),
        };

        info!(
            "Assembled tables: recipes={}, ingredients={}, steps={}, interactions={} (dropped {} duplicate recipes)",
            tables.recipes.len(),
            tables.ingredients.len(),
            tables.steps.len(),
            tables.interactions.len(),
            self.dropped_recipes
        );

        tables
    }
}
