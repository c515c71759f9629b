//! Canonical row types.
//!
//! Field order in each struct matches the table's column order, so serde
//! output and [`Entity::cells`] agree.

use serde::Serialize;

use crate::entity::{format_float, Entity, FieldValue};

/// One recipe.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recipe {
    pub recipe_id: String,
    pub name: String,
    pub description: String,
    pub servings: FieldValue,
    pub prep_time_minutes: FieldValue,
    pub cook_time_minutes: FieldValue,
    pub difficulty: String,
    pub cuisine: String,
    pub created_at: String,
}

impl Entity for Recipe {
    const NAME: &'static str = "recipes";
    const COLUMNS: &'static [&'static str] = &[
        "recipe_id",
        "name",
        "description",
        "servings",
        "prep_time_minutes",
        "cook_time_minutes",
        "difficulty",
        "cuisine",
        "created_at",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.recipe_id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.servings.to_string(),
            self.prep_time_minutes.to_string(),
            self.cook_time_minutes.to_string(),
            self.difficulty.clone(),
            self.cuisine.clone(),
            self.created_at.clone(),
        ]
    }
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngredientLine {
    pub ingredient_id: String,
    pub recipe_id: String,
    pub ingredient_name: String,
    pub qty_numeric: Option<f64>,
    pub unit: String,
    /// Original quantity text, kept for audit
    pub qty_text: String,
}

impl Entity for IngredientLine {
    const NAME: &'static str = "ingredients";
    const COLUMNS: &'static [&'static str] = &[
        "ingredient_id",
        "recipe_id",
        "ingredient_name",
        "qty_numeric",
        "unit",
        "qty_text",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.ingredient_id.clone(),
            self.recipe_id.clone(),
            self.ingredient_name.clone(),
            self.qty_numeric.map(format_float).unwrap_or_default(),
            self.unit.clone(),
            self.qty_text.clone(),
        ]
    }
}

/// One preparation step of a recipe.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Step {
    pub step_id: String,
    pub recipe_id: String,
    /// 1-based position within the recipe, in source order
    pub step_order: u32,
    pub step_text: String,
}

impl Entity for Step {
    const NAME: &'static str = "steps";
    const COLUMNS: &'static [&'static str] = &["step_id", "recipe_id", "step_order", "step_text"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.step_id.clone(),
            self.recipe_id.clone(),
            self.step_order.to_string(),
            self.step_text.clone(),
        ]
    }
}

/// One user interaction with a recipe.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Interaction {
    pub interaction_id: String,
    pub user_id: String,
    pub recipe_id: String,
    #[serde(rename = "type")]
    pub interaction_type: String,
    /// Only populated for `cook` interactions
    pub rating: FieldValue,
    pub timestamp: String,
}

impl Entity for Interaction {
    const NAME: &'static str = "interactions";
    const COLUMNS: &'static [&'static str] = &[
        "interaction_id",
        "user_id",
        "recipe_id",
        "type",
        "rating",
        "timestamp",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.interaction_id.clone(),
            self.user_id.clone(),
            self.recipe_id.clone(),
            self.interaction_type.clone(),
            self.rating.to_string(),
            self.timestamp.clone(),
        ]
    }
}
