//! Core entity trait and cell types for canonical table rows.
//!
//! Every canonical table (recipes, ingredients, steps, interactions) is a
//! sequence of rows implementing [`Entity`]. Rows know their table name and
//! fixed column order, and render each cell as the string the sink stores.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A loosely-typed scalar cell.
///
/// Source documents disagree on whether `servings` is `4`, `4.0` or `"4"`.
/// Fields that must survive malformed input keep the source value here so the
/// validator can report it instead of the builder silently dropping it.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    #[default]
    Null,
}

impl FieldValue {
    /// Build a cell from a raw JSON value.
    ///
    /// Arrays and objects have no scalar form, so they are kept as compact
    /// JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::String(n.to_string())
                }
            }
            Value::String(s) => FieldValue::String(s.trim().to_string()),
            other => FieldValue::String(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", format_float(*fl)),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => Ok(()),
        }
    }
}

/// Render a float the way the tables store it: integral values keep one
/// decimal place (`1.0`), everything else uses the shortest round-trip form.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// A rule violation found while validating a canonical row.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A required field is absent or empty after all fallbacks.
    MissingField { field: &'static str },
    /// A value is present but cannot be read as its expected type or range.
    MalformedValue { field: &'static str, message: String },
    /// A value is outside its enumeration.
    InvalidChoice { field: &'static str, value: String },
    /// A key value already seen earlier in the same table.
    Duplicate { field: &'static str, value: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField { field } => write!(f, "Missing {}", field),
            Violation::MalformedValue { message, .. } => write!(f, "{}", message),
            Violation::InvalidChoice { field, value } => {
                write!(f, "Invalid {} '{}'", field, value)
            }
            Violation::Duplicate { field, value } => {
                write!(f, "Duplicate {} '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for Violation {}

/// Core trait for all canonical rows.
///
/// # Example
///
/// ```ignore
/// use recipe_etl::Entity;
///
/// impl Entity for Step {
///     const NAME: &'static str = "steps";
///     const COLUMNS: &'static [&'static str] = &["step_id", "recipe_id", "step_order", "step_text"];
///
///     fn cells(&self) -> Vec<String> {
///         vec![self.step_id.clone(), self.recipe_id.clone(), self.step_order.to_string(), self.step_text.clone()]
///     }
/// }
/// ```
pub trait Entity: Serialize + Sized {
    /// Table name, also used as the validation report key
    const NAME: &'static str;

    /// Canonical column order
    const COLUMNS: &'static [&'static str];

    /// Cells rendered in [`Entity::COLUMNS`] order
    fn cells(&self) -> Vec<String>;

    /// Convert entity to JSON string
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_from_json() {
        assert_eq!(FieldValue::from_json(&json!(5)), FieldValue::Int(5));
        assert_eq!(FieldValue::from_json(&json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(
            FieldValue::from_json(&json!("  4 ")),
            FieldValue::String("4".to_string())
        );
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(
            FieldValue::from_json(&json!([1, 2])),
            FieldValue::String("[1,2]".to_string())
        );
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Int(5).to_string(), "5");
        assert_eq!(FieldValue::Float(1.0).to_string(), "1.0");
        assert_eq!(FieldValue::Float(0.25).to_string(), "0.25");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn test_field_value_as_f64() {
        assert_eq!(FieldValue::String("12".to_string()).as_f64(), Some(12.0));
        assert_eq!(FieldValue::String("abc".to_string()).as_f64(), None);
        assert_eq!(FieldValue::Null.as_f64(), None);
        assert!(FieldValue::String(String::new()).is_empty());
    }

    #[test]
    fn test_violation_messages() {
        let missing = Violation::MissingField { field: "recipe_id" };
        assert_eq!(missing.to_string(), "Missing recipe_id");

        let malformed = Violation::MalformedValue {
            field: "rating",
            message: "rating must be between 1 and 5".to_string(),
        };
        assert_eq!(malformed.to_string(), "rating must be between 1 and 5");

        let choice = Violation::InvalidChoice {
            field: "type",
            value: "share".to_string(),
        };
        assert_eq!(choice.to_string(), "Invalid type 'share'");
    }
}
