//! End-to-end tests: raw documents through builders, assembly, sink and
//! validation.

use recipe_etl::extraction::resolve;
use recipe_etl::ingredient;
use recipe_etl::{
    Entity, MemorySink, Pipeline, PipelineConfig, RawBatch, Recipe, SequentialIdGenerator,
    Step, Validator,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn pipeline() -> Pipeline<SequentialIdGenerator> {
    Pipeline::with_id_generator(PipelineConfig::default(), SequentialIdGenerator::new())
}

fn tea() -> Value {
    json!({
        "id": "R1",
        "title": "Tea",
        "prep_time": 5,
        "ingredients": "Water, 1 tsp Sugar",
        "steps": "Boil water. Add sugar."
    })
}

#[test]
fn test_tea_end_to_end() {
    let tables = pipeline().normalize(&RawBatch::new(vec![tea()], Vec::new()));

    let recipes = tables.recipes.records();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["recipe_id"], "R1");
    assert_eq!(recipes[0]["name"], "Tea");
    assert_eq!(recipes[0]["prep_time_minutes"], "5");
    assert_eq!(recipes[0]["cook_time_minutes"], "");

    let ingredients = tables.ingredients.records();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0]["ingredient_name"], "Water");
    assert_eq!(ingredients[0]["qty_numeric"], "");
    assert_eq!(ingredients[1]["ingredient_name"], "Sugar");
    assert_eq!(ingredients[1]["qty_numeric"], "1.0");
    assert_eq!(ingredients[1]["unit"], "tsp");

    let steps = tables.steps.records();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["step_order"], "1");
    assert_eq!(steps[0]["step_text"], "Boil water.");
    assert_eq!(steps[1]["step_order"], "2");
    assert_eq!(steps[1]["step_text"], "Add sugar.");

    let report = Validator::new().validate_tables(&tables);
    assert_eq!(report.invalid_count(), 0);
}

#[test]
fn test_cook_interaction_with_out_of_range_score_is_invalid() {
    let batch = RawBatch::new(
        Vec::new(),
        vec![json!({"user": "U1", "recipe": "R1", "type": "cook", "score": 6})],
    );
    let report = pipeline().run(&batch, &mut MemorySink::new()).unwrap();

    let interactions = report.get("interactions").unwrap();
    assert!(interactions.valid.is_empty());
    assert_eq!(interactions.invalid.len(), 1);
    assert!(interactions.invalid[0]
        .errors
        .contains(&"rating must be between 1 and 5".to_string()));
}

#[test]
fn test_resolver_prefers_earlier_candidate() {
    let record = json!({"title": "Second", "name": "First"});
    assert_eq!(resolve(&record, &["name", "title"], Value::Null), json!("First"));
}

#[test]
fn test_free_text_ingredient_properties() {
    let parsed = ingredient::parse(&json!("1 cup rice"));
    assert_eq!(parsed.name, "rice");
    assert_eq!(parsed.qty_numeric, Some(1.0));
    assert_eq!(parsed.unit, "cup");

    for text in ["Salt", "fresh basil leaves", "a pinch of pepper"] {
        let parsed = ingredient::parse(&json!(text));
        assert_eq!(parsed.name, text);
        assert_eq!(parsed.qty_text, text);
        assert_eq!(parsed.qty_numeric, None);
    }
}

#[test]
fn test_structured_numeric_quantity_is_exact() {
    for qty in [0.25, 1.0, 2.5, 400.0] {
        let parsed = ingredient::parse(&json!({"name": "Flour", "quantity": qty, "unit": "g"}));
        assert_eq!(parsed.qty_numeric, Some(qty));
        assert_eq!(parsed.qty_text, "");
    }
}

#[test]
fn test_recipe_ids_unique_and_steps_contiguous() {
    let batch = RawBatch::new(
        vec![
            tea(),
            json!({"recipe_id": "R1", "name": "Tea (duplicate)", "steps": ["Ignore me."]}),
            json!({
                "doc_id": "R2",
                "name": "Toast",
                "method": ["Slice bread.", "", {"step_text": "Toast it."}, null, "Butter it."]
            }),
            json!({"name": "Mystery", "directions": "Mix.\nBake for 1.5 hours. Cool!"}),
        ],
        Vec::new(),
    );
    let tables = pipeline().normalize(&batch);

    let recipe_ids: Vec<String> = tables
        .recipes
        .records()
        .iter()
        .map(|r| r["recipe_id"].clone())
        .collect();
    assert_eq!(recipe_ids.len(), 3);
    let mut deduped = recipe_ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), recipe_ids.len());

    let mut orders: HashMap<String, Vec<u32>> = HashMap::new();
    for step in tables.steps.records() {
        orders
            .entry(step["recipe_id"].clone())
            .or_default()
            .push(step["step_order"].parse().unwrap());
    }
    for (recipe_id, found) in &orders {
        let expected: Vec<u32> = (1..=found.len() as u32).collect();
        assert_eq!(found, &expected, "step orders for {}", recipe_id);
    }
    assert_eq!(orders["R2"].len(), 3);
    assert_eq!(orders[&recipe_ids[2]].len(), 3);

    let report = Validator::new().validate_tables(&tables);
    assert!(report.get("steps").unwrap().invalid.is_empty());
}

#[test]
fn test_rating_present_iff_cook() {
    let batch = RawBatch::new(
        Vec::new(),
        vec![
            json!({"interaction_id": "I1", "user_id": "U1", "recipe_id": "R1", "type": "cook", "rating": 4}),
            json!({"interaction_id": "I2", "user_id": "U1", "recipe_id": "R1", "type": "view", "rating": 5}),
            json!({"interaction_id": "I3", "uid": "U2", "recipeId": "R1", "action": "like"}),
            json!({"interaction_id": "I4", "user": "U3", "recipe": "R1", "interaction_type": "cook", "score": "3"}),
        ],
    );
    let tables = pipeline().normalize(&batch);

    for record in tables.interactions.records() {
        let has_rating = !record["rating"].is_empty();
        assert_eq!(has_rating, record["type"] == "cook", "{:?}", record);
    }

    let report = Validator::new().validate_tables(&tables);
    assert_eq!(report.get("interactions").unwrap().valid.len(), 4);
}

#[test]
fn test_classification_is_idempotent() {
    let batch = RawBatch::new(
        vec![
            tea(),
            json!({"id": "R9", "servings": "lots", "difficulty": "Impossible"}),
        ],
        vec![json!({"user": "U1", "recipe": "R1", "type": "cook", "score": 6})],
    );
    let mut sink = MemorySink::new();
    let first = pipeline().run(&batch, &mut sink).unwrap();

    let validator = Validator::new();
    let second = validator.validate_sink(&sink);
    let third = validator.validate_sink(&sink);

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(first.get("recipes").unwrap().invalid.len(), 1);
}

#[test]
fn test_derived_fields_stable_across_runs() {
    let batch = RawBatch::new(vec![json!({"title": "Soup", "ingredients": "2 cups stock; salt"})], Vec::new());

    let first = Pipeline::new(PipelineConfig::default()).normalize(&batch);
    let second = Pipeline::new(PipelineConfig::default()).normalize(&batch);

    let derived = |tables: &recipe_etl::CanonicalTables| -> Vec<(String, String, String)> {
        tables
            .ingredients
            .records()
            .iter()
            .map(|r| {
                (
                    r["ingredient_name"].clone(),
                    r["qty_numeric"].clone(),
                    r["unit"].clone(),
                )
            })
            .collect()
    };
    assert_eq!(derived(&first), derived(&second));
    assert!(first.recipes.records()[0]["recipe_id"].starts_with("R_"));
}

#[test]
fn test_empty_batch_still_produces_all_tables() {
    let mut sink = MemorySink::new();
    let report = pipeline().run(&RawBatch::default(), &mut sink).unwrap();

    assert_eq!(report.tables.len(), 4);
    assert_eq!(report.valid_count() + report.invalid_count(), 0);
    assert_eq!(Recipe::COLUMNS.len(), 9);
    assert_eq!(Step::NAME, "steps");
}
