//! Fallback field resolution over loosely-typed records.
//!
//! Producers of the exported documents renamed fields over time (`title`
//! became `name`, `prep_time` became `prep_time_minutes`, ...). Each canonical
//! field therefore has an ordered list of candidate keys, newest or most
//! specific first, and the first usable one wins.

use serde_json::{Map, Value};

/// Candidate key lists, in priority order.
pub mod keys {
    pub const RECIPE_ID: &[&str] = &["recipe_id", "id", "document_id", "doc_id", "_doc_id"];
    pub const RECIPE_NAME: &[&str] = &["name", "title"];
    pub const DESCRIPTION: &[&str] = &["description", "desc"];
    pub const SERVINGS: &[&str] = &["servings", "serves"];
    pub const PREP_TIME: &[&str] = &[
        "prep_time_minutes",
        "prep_time",
        "prep_time_mins",
        "prep_minutes",
    ];
    pub const COOK_TIME: &[&str] = &[
        "cook_time_minutes",
        "cook_time",
        "cook_time_mins",
        "cook_minutes",
    ];
    pub const DIFFICULTY: &[&str] = &["difficulty", "level"];
    pub const CUISINE: &[&str] = &["cuisine", "category"];
    pub const CREATED_AT: &[&str] = &["created_at", "createdAt", "created"];
    pub const INGREDIENTS: &[&str] = &["ingredients", "ingredient_list", "ingredient"];
    pub const STEPS: &[&str] = &["steps", "instructions", "method", "directions"];
    pub const STEP_TEXT: &[&str] = &["text", "step_text", "instruction", "description"];

    pub const INGREDIENT_NAME: &[&str] = &["name", "item", "ingredient", "ingredient_name", "label"];
    pub const NESTED_NAME: &[&str] = &["name", "label"];
    pub const QUANTITY: &[&str] = &["qty", "quantity", "amount", "qty_numeric", "qty_text"];
    pub const UNIT: &[&str] = &["unit", "units", "u", "measure"];

    pub const INTERACTION_ID: &[&str] = &["interaction_id", "id", "doc_id", "_doc_id"];
    pub const USER_ID: &[&str] = &["user_id", "user", "userId", "uid"];
    pub const INTERACTION_RECIPE_ID: &[&str] = &["recipe_id", "recipe", "recipeId"];
    pub const INTERACTION_TYPE: &[&str] = &["type", "interaction_type", "action"];
    pub const TIMESTAMP: &[&str] = &["timestamp", "time", "created_at", "createdAt"];
    pub const RATING: &[&str] = &["rating", "score"];
}

/// Trait for records that can be looked up by field name.
pub trait Extractor {
    /// Value stored under `key`, if any
    fn field(&self, key: &str) -> Option<&Value>;

    /// First candidate key whose value is present, non-null and not the
    /// literal string `"NaN"`.
    fn resolve(&self, candidates: &[&str]) -> Option<&Value> {
        candidates
            .iter()
            .filter_map(|key| self.field(key))
            .find(|value| is_usable(value))
    }
}

impl Extractor for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl Extractor for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

fn is_usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => s != "NaN",
        _ => true,
    }
}

/// Resolve `candidates` against `record`, falling back to `default`.
///
/// Total over all inputs: a record that is not a mapping yields `default`.
///
/// # Example
///
/// ```
/// use recipe_etl::extraction::resolve;
/// use serde_json::json;
///
/// let record = json!({"title": "Tea", "name": "Chai"});
/// assert_eq!(resolve(&record, &["name", "title"], json!("")), json!("Chai"));
/// ```
pub fn resolve(record: &Value, candidates: &[&str], default: Value) -> Value {
    record.resolve(candidates).cloned().unwrap_or(default)
}

/// Resolve `candidates` and coerce the result to trimmed text (empty when
/// nothing resolves).
pub fn resolve_text(record: &Value, candidates: &[&str]) -> String {
    record
        .resolve(candidates)
        .map(|value| value_to_text(value).trim().to_string())
        .unwrap_or_default()
}

/// Coerce a raw value to text: strings verbatim, numbers in JSON form,
/// null as empty, arrays and objects as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
