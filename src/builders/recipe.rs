//! Recipe builder: one raw recipe document becomes a recipe row plus its
//! ingredient lines and steps.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::EntityBuilder;
use crate::entity::FieldValue;
use crate::extraction::{keys, resolve, resolve_text, value_to_text, Extractor};
use crate::ids::{IdGenerator, IdPrefixes};
use crate::ingredient;
use crate::models::{IngredientLine, Recipe, Step};
use crate::timestamp;

static INGREDIENT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,]").expect("valid ingredient separator regex"));

/// Sentence end followed by whitespace, or a newline.
static STEP_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+|\n").expect("valid step boundary regex"));

/// A recipe row with the rows derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeBundle {
    pub recipe: Recipe,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeBuilder {
    prefixes: IdPrefixes,
}

impl RecipeBuilder {
    pub fn new(prefixes: IdPrefixes) -> Self {
        Self { prefixes }
    }
}

impl EntityBuilder for RecipeBuilder {
    type Output = RecipeBundle;

    fn name(&self) -> &'static str {
        "recipe"
    }

    fn build(&self, record: &Value, ids: &mut dyn IdGenerator) -> RecipeBundle {
        // Present means any candidate resolves to non-empty text, even when it
        // equals the recipe name.
        let mut recipe_id = resolve_text(record, keys::RECIPE_ID);
        if recipe_id.is_empty() {
            recipe_id = ids.next_id(&self.prefixes.recipe);
            debug!("Generated recipe id {}", recipe_id);
        }

        let recipe = Recipe {
            recipe_id: recipe_id.clone(),
            name: resolve_text(record, keys::RECIPE_NAME),
            description: resolve_text(record, keys::DESCRIPTION),
            servings: resolve_cell(record, keys::SERVINGS),
            prep_time_minutes: resolve_cell(record, keys::PREP_TIME),
            cook_time_minutes: resolve_cell(record, keys::COOK_TIME),
            difficulty: resolve_text(record, keys::DIFFICULTY),
            cuisine: resolve_text(record, keys::CUISINE),
            created_at: timestamp::normalize(&resolve(record, keys::CREATED_AT, Value::Null)),
        };

        let ingredients = ingredient_entries(record.resolve(keys::INGREDIENTS))
            .iter()
            .map(|entry| {
                let parsed = ingredient::parse(entry);
                IngredientLine {
                    ingredient_id: ids.next_id(&self.prefixes.ingredient),
                    recipe_id: recipe_id.clone(),
                    ingredient_name: parsed.name,
                    qty_numeric: parsed.qty_numeric,
                    unit: parsed.unit,
                    qty_text: parsed.qty_text,
                }
            })
            .collect();

        let steps = step_texts(record.resolve(keys::STEPS))
            .into_iter()
            .zip(1u32..)
            .map(|(step_text, step_order)| Step {
                step_id: ids.next_id(&self.prefixes.step),
                recipe_id: recipe_id.clone(),
                step_order,
                step_text,
            })
            .collect();

        RecipeBundle {
            recipe,
            ingredients,
            steps,
        }
    }
}

fn resolve_cell(record: &Value, candidates: &[&str]) -> FieldValue {
    record
        .resolve(candidates)
        .map(FieldValue::from_json)
        .unwrap_or_default()
}

/// Flatten the raw ingredient collection into individual entries.
///
/// A single string is split on `,` and `;`; a single mapping is one entry.
fn ingredient_entries(raw: Option<&Value>) -> Vec<Value> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(text)) => INGREDIENT_SEPARATOR
            .split(text)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| match item {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
            .cloned()
            .collect(),
        Some(other) => vec![other.clone()],
    }
}

/// Flatten the raw step collection into trimmed, non-empty step texts in
/// source order.
fn step_texts(raw: Option<&Value>) -> Vec<String> {
    let texts = match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(text)) => split_steps(text),
        Some(Value::Array(items)) => items.iter().map(step_text).collect(),
        Some(other) => vec![step_text(other)],
    };

    texts
        .into_iter()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

fn step_text(entry: &Value) -> String {
    match entry {
        Value::Object(map) => map.resolve(keys::STEP_TEXT).map(value_to_text).unwrap_or_default(),
        other => value_to_text(other),
    }
}

/// Split a step paragraph at sentence ends and newlines, keeping the
/// terminal punctuation with its sentence.
pub fn split_steps(text: &str) -> Vec<String> {
    let mut steps = Vec::new();
    let mut start = 0;

    for boundary in STEP_BOUNDARY.find_iter(text) {
        let end = if boundary.as_str().starts_with('\n') {
            boundary.start()
        } else {
            boundary.start() + 1
        };
        steps.push(text[start..end].trim().to_string());
        start = boundary.end();
    }
    steps.push(text[start..].trim().to_string());

    steps.retain(|step| !step.is_empty());
    steps
}
