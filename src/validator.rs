//! Row validation for the canonical tables.
//!
//! Every row starts [`RowStatus::Unchecked`] and ends `Valid` or `Invalid`
//! with all of its violations attached. Tables are validated independently;
//! references between tables are not checked. Validation only reads, so
//! running it twice over the same table gives the same partition.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assembler::{CanonicalTables, Record, Table};
use crate::builders::interaction::COOK;
use crate::entity::{Entity, Violation};
use crate::models::{IngredientLine, Interaction, Recipe, Step};
use crate::serialization::TableSink;

pub const DIFFICULTIES: &[&str] = &["Easy", "Medium", "Hard"];
pub const INTERACTION_TYPES: &[&str] = &["view", "like", "cook"];

const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

/// Validation state of one row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RowStatus {
    #[default]
    Unchecked,
    Valid,
    Invalid(Vec<Violation>),
}

impl RowStatus {
    fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            RowStatus::Valid
        } else {
            RowStatus::Invalid(violations)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, RowStatus::Valid)
    }
}

/// A row that failed validation, serialized as its cells plus `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidRow {
    #[serde(flatten)]
    pub record: Record,
    pub errors: Vec<String>,
}

/// Valid and invalid rows of one table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EntityReport {
    pub valid: Vec<Record>,
    pub invalid: Vec<InvalidRow>,
}

impl EntityReport {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }
}

/// Per-table reports keyed by table name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    pub tables: IndexMap<String, EntityReport>,
}

impl ValidationReport {
    pub fn get(&self, table: &str) -> Option<&EntityReport> {
        self.tables.get(table)
    }

    pub fn valid_count(&self) -> usize {
        self.tables.values().map(|r| r.valid.len()).sum()
    }

    pub fn invalid_count(&self) -> usize {
        self.tables.values().map(|r| r.invalid.len()).sum()
    }
}

/// Stateless rule runner for the four canonical tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_tables(&self, tables: &CanonicalTables) -> ValidationReport {
        let mut report = ValidationReport::default();
        for table in tables.iter() {
            report
                .tables
                .insert(table.name.clone(), self.validate_table(table));
        }
        log_summary(&report);
        report
    }

    /// Read the canonical tables back from `sink` and validate them.
    ///
    /// A table the sink cannot produce is logged and validated as empty.
    pub fn validate_sink(&self, sink: &dyn TableSink) -> ValidationReport {
        let tables = CanonicalTables {
            recipes: read_or_empty::<Recipe>(sink),
            ingredients: read_or_empty::<IngredientLine>(sink),
            steps: read_or_empty::<Step>(sink),
            interactions: read_or_empty::<Interaction>(sink),
        };
        self.validate_tables(&tables)
    }

    /// Partition the rows of one table into valid and invalid buckets.
    pub fn validate_table(&self, table: &Table) -> EntityReport {
        let records = table.records();
        let statuses = self.row_statuses(&table.name, &records);

        let mut report = EntityReport::default();
        for (record, status) in records.into_iter().zip(statuses) {
            match status {
                RowStatus::Invalid(violations) => report.invalid.push(InvalidRow {
                    record,
                    errors: violations.iter().map(ToString::to_string).collect(),
                }),
                _ => report.valid.push(record),
            }
        }
        report
    }

    /// Classify each record of the table called `table`.
    pub fn row_statuses(&self, table: &str, records: &[Record]) -> Vec<RowStatus> {
        let mut statuses = vec![RowStatus::Unchecked; records.len()];

        let violations = match table {
            t if t == Recipe::NAME => check_recipes(records),
            t if t == IngredientLine::NAME => check_ingredients(records),
            t if t == Step::NAME => check_steps(records),
            t if t == Interaction::NAME => check_interactions(records),
            other => {
                warn!("No rules for table '{}', accepting all rows", other);
                vec![Vec::new(); records.len()]
            }
        };

        for (status, found) in statuses.iter_mut().zip(violations) {
            *status = RowStatus::from_violations(found);
        }
        statuses
    }
}

fn read_or_empty<E: Entity>(sink: &dyn TableSink) -> Table {
    match sink.read_table(E::NAME, E::COLUMNS) {
        Ok(table) => table,
        Err(e) => {
            warn!("Could not read table '{}', validating as empty: {}", E::NAME, e);
            Table::empty::<E>()
        }
    }
}

fn log_summary(report: &ValidationReport) {
    for (name, entity) in &report.tables {
        info!(
            "Validated {}: {} valid, {} invalid",
            name,
            entity.valid.len(),
            entity.invalid.len()
        );
    }
}

/// Trimmed cell value; a missing column or the literal `NaN` reads as empty.
fn cell<'a>(record: &'a Record, column: &str) -> &'a str {
    let value = record.get(column).map(|s| s.trim()).unwrap_or("");
    if value == "NaN" {
        ""
    } else {
        value
    }
}

fn require(record: &Record, field: &'static str, out: &mut Vec<Violation>) {
    if cell(record, field).is_empty() {
        out.push(Violation::MissingField { field });
    }
}

fn check_non_negative(record: &Record, field: &'static str, out: &mut Vec<Violation>) {
    let value = cell(record, field);
    if value.is_empty() {
        return;
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => {}
        _ => out.push(Violation::MalformedValue {
            field,
            message: format!("Invalid {} '{}'", field, value),
        }),
    }
}

/// Flag later rows repeating an earlier non-empty value of `field`.
fn check_unique(records: &[Record], field: &'static str, found: &mut [Vec<Violation>]) {
    let mut seen = HashSet::new();
    for (record, out) in records.iter().zip(found.iter_mut()) {
        let value = cell(record, field);
        if !value.is_empty() && !seen.insert(value) {
            out.push(Violation::Duplicate {
                field,
                value: value.to_string(),
            });
        }
    }
}

fn check_recipes(records: &[Record]) -> Vec<Vec<Violation>> {
    let mut found: Vec<Vec<Violation>> = records
        .iter()
        .map(|record| {
            let mut out = Vec::new();
            require(record, "recipe_id", &mut out);
            require(record, "name", &mut out);
            check_non_negative(record, "servings", &mut out);
            check_non_negative(record, "prep_time_minutes", &mut out);
            check_non_negative(record, "cook_time_minutes", &mut out);

            let difficulty = cell(record, "difficulty");
            if !difficulty.is_empty() && !DIFFICULTIES.contains(&difficulty) {
                out.push(Violation::InvalidChoice {
                    field: "difficulty",
                    value: difficulty.to_string(),
                });
            }
            out
        })
        .collect();

    check_unique(records, "recipe_id", &mut found);
    found
}

fn check_ingredients(records: &[Record]) -> Vec<Vec<Violation>> {
    let mut found: Vec<Vec<Violation>> = records
        .iter()
        .map(|record| {
            let mut out = Vec::new();
            require(record, "ingredient_id", &mut out);
            require(record, "recipe_id", &mut out);
            require(record, "ingredient_name", &mut out);
            check_non_negative(record, "qty_numeric", &mut out);
            out
        })
        .collect();

    check_unique(records, "ingredient_id", &mut found);
    found
}

fn parse_step_order(record: &Record) -> Result<i64, Violation> {
    let value = cell(record, "step_order");
    if value.is_empty() {
        return Err(Violation::MissingField { field: "step_order" });
    }
    let order = value.parse::<i64>().map_err(|_| Violation::MalformedValue {
        field: "step_order",
        message: "step_order must be integer".to_string(),
    })?;
    if order < 1 {
        return Err(Violation::MalformedValue {
            field: "step_order",
            message: "step_order must be >= 1".to_string(),
        });
    }
    Ok(order)
}

fn check_steps(records: &[Record]) -> Vec<Vec<Violation>> {
    let orders: Vec<Result<i64, Violation>> = records.iter().map(parse_step_order).collect();

    let mut present: HashMap<&str, HashSet<i64>> = HashMap::new();
    for (record, order) in records.iter().zip(&orders) {
        if let Ok(order) = order {
            present
                .entry(cell(record, "recipe_id"))
                .or_default()
                .insert(*order);
        }
    }

    let mut seen: HashSet<(&str, i64)> = HashSet::new();
    let mut found: Vec<Vec<Violation>> = records
        .iter()
        .zip(&orders)
        .map(|(record, order)| {
            let mut out = Vec::new();
            require(record, "step_id", &mut out);
            require(record, "recipe_id", &mut out);

            let recipe_id = cell(record, "recipe_id");
            match order {
                Err(violation) => out.push(violation.clone()),
                Ok(order) => {
                    if !seen.insert((recipe_id, *order)) {
                        out.push(Violation::Duplicate {
                            field: "step_order",
                            value: order.to_string(),
                        });
                    }
                    let previous_present = present
                        .get(recipe_id)
                        .is_some_and(|orders| orders.contains(&(order - 1)));
                    if *order > 1 && !previous_present {
                        out.push(Violation::MalformedValue {
                            field: "step_order",
                            message: format!(
                                "step_order {} is not contiguous (step {} missing)",
                                order,
                                order - 1
                            ),
                        });
                    }
                }
            }

            require(record, "step_text", &mut out);
            out
        })
        .collect();

    check_unique(records, "step_id", &mut found);
    found
}

fn check_rating(record: &Record, out: &mut Vec<Violation>) {
    let interaction_type = cell(record, "type");
    let rating = cell(record, "rating");

    if interaction_type != COOK {
        if !rating.is_empty() {
            out.push(Violation::MalformedValue {
                field: "rating",
                message: "non-cook interaction must not have a rating".to_string(),
            });
        }
        return;
    }

    if rating.is_empty() {
        out.push(Violation::MalformedValue {
            field: "rating",
            message: "cook interaction must have a rating".to_string(),
        });
        return;
    }

    match rating.parse::<f64>() {
        Ok(value) if (MIN_RATING..=MAX_RATING).contains(&value) => {}
        Ok(_) => out.push(Violation::MalformedValue {
            field: "rating",
            message: "rating must be between 1 and 5".to_string(),
        }),
        Err(_) => out.push(Violation::MalformedValue {
            field: "rating",
            message: "rating must be numeric".to_string(),
        }),
    }
}

fn check_interactions(records: &[Record]) -> Vec<Vec<Violation>> {
    let mut found: Vec<Vec<Violation>> = records
        .iter()
        .map(|record| {
            let mut out = Vec::new();
            require(record, "interaction_id", &mut out);
            require(record, "user_id", &mut out);
            require(record, "recipe_id", &mut out);
            require(record, "type", &mut out);

            let interaction_type = cell(record, "type");
            if !interaction_type.is_empty() && !INTERACTION_TYPES.contains(&interaction_type) {
                out.push(Violation::InvalidChoice {
                    field: "type",
                    value: interaction_type.to_string(),
                });
            }

            check_rating(record, &mut out);
            debug!("Interaction {:?}: {} violations", record.get("interaction_id"), out.len());
            out
        })
        .collect();

    check_unique(records, "interaction_id", &mut found);
    found
}
