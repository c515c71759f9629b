//! Ingredient parsing.
//!
//! Ingredient entries arrive as structured mappings from newer forms and as
//! free text from older ones. Every entry is first classified as an
//! [`IngredientEntry`], then parsed by the strategy for that variant. Every
//! input yields some name; the original text is always kept in `qty_text`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extraction::{keys, value_to_text, Extractor};

/// Normalized ingredient fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedIngredient {
    pub name: String,
    pub qty_numeric: Option<f64>,
    pub unit: String,
    pub qty_text: String,
}

/// Shape of a raw ingredient entry.
#[derive(Debug, Clone, Copy)]
pub enum IngredientEntry<'a> {
    Structured(&'a Map<String, Value>),
    Text(&'a str),
    Other(&'a Value),
}

impl<'a> IngredientEntry<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => IngredientEntry::Structured(map),
            Value::String(s) => IngredientEntry::Text(s),
            other => IngredientEntry::Other(other),
        }
    }
}

/// Quantity token: mixed number, simple fraction, or decimal.
const QTY: &str = r"\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?|\.\d+";

/// `<qty>[-–— ]<rest>`
static LEADING_QTY_WITH_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({QTY})[-–— ]\s*(.+)$")).expect("valid leading quantity regex")
});

/// `<number> <unit> <name...>` with arbitrary whitespace
static LEADING_QTY_UNIT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s+(\S+)\s+(.+)$").expect("valid quantity-unit-name regex")
});

/// `<name...> <number> <unit>?`
static TRAILING_QTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(.+?)\s+({QTY})(?:\s*([A-Za-z]+\.?))?$"))
        .expect("valid trailing quantity regex")
});

static QTY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(QTY).expect("valid quantity token regex"));

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?|\.\d+").expect("valid number regex"));

static UNIT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z.]*)").expect("valid unit regex"));

/// Parse any raw ingredient entry.
pub fn parse(entry: &Value) -> ParsedIngredient {
    match IngredientEntry::classify(entry) {
        IngredientEntry::Structured(map) => parse_structured(map),
        IngredientEntry::Text(text) => parse_text(text),
        IngredientEntry::Other(value) => {
            let text = value_to_text(value);
            ParsedIngredient {
                name: text.clone(),
                qty_text: text,
                ..Default::default()
            }
        }
    }
}

fn parse_structured(map: &Map<String, Value>) -> ParsedIngredient {
    let name = match map.resolve(keys::INGREDIENT_NAME) {
        Some(nested @ Value::Object(_)) => nested
            .resolve(keys::NESTED_NAME)
            .map(value_to_text)
            .unwrap_or_default(),
        Some(value) => value_to_text(value),
        None => String::new(),
    };

    let mut unit = map
        .resolve(keys::UNIT)
        .map(|v| value_to_text(v).trim().to_string())
        .unwrap_or_default();

    let mut parsed = ParsedIngredient {
        name: name.trim().to_string(),
        ..Default::default()
    };

    match map.resolve(keys::QUANTITY) {
        Some(Value::Number(n)) => parsed.qty_numeric = n.as_f64(),
        Some(Value::String(text)) => {
            if let Some((qty, end)) = quantity_in_text(text) {
                parsed.qty_numeric = Some(qty);
                if unit.is_empty() {
                    unit = UNIT_TOKEN
                        .captures(&text[end..])
                        .map(|caps| caps[1].to_string())
                        .unwrap_or_default();
                }
            }
            parsed.qty_text = text.clone();
        }
        Some(other) => parsed.qty_text = value_to_text(other),
        None => {}
    }

    parsed.unit = unit;
    parsed
}

/// First quantity in `text` and the byte offset just past it.
///
/// Fractions and mixed numbers are read whole; a token that isn't a valid
/// quantity (`1/0`) falls back to the first plain number.
fn quantity_in_text(text: &str) -> Option<(f64, usize)> {
    if let Some(m) = QTY_TOKEN.find(text) {
        if let Some(qty) = parse_quantity(m.as_str()) {
            return Some((qty, m.end()));
        }
    }
    let m = FIRST_NUMBER.find(text)?;
    Some((m.as_str().parse::<f64>().ok()?, m.end()))
}

/// Parse a free-text entry with the ordered pattern chain.
pub fn parse_text(raw: &str) -> ParsedIngredient {
    let text = raw.trim();

    leading_quantity_with_separator(text)
        .or_else(|| leading_quantity_unit_name(text))
        .or_else(|| trailing_quantity(text))
        .unwrap_or_else(|| ParsedIngredient {
            name: text.to_string(),
            qty_text: text.to_string(),
            ..Default::default()
        })
}

fn leading_quantity_with_separator(text: &str) -> Option<ParsedIngredient> {
    let caps = LEADING_QTY_WITH_SEPARATOR.captures(text)?;
    let qty = parse_quantity(&caps[1])?;
    let rest = caps[2].trim();

    let (unit, name) = match rest.split_once(char::is_whitespace) {
        Some((unit, name)) => (unit.to_string(), name.trim().to_string()),
        None => (String::new(), rest.to_string()),
    };

    Some(ParsedIngredient {
        name,
        qty_numeric: Some(qty),
        unit,
        qty_text: text.to_string(),
    })
}

fn leading_quantity_unit_name(text: &str) -> Option<ParsedIngredient> {
    let caps = LEADING_QTY_UNIT_NAME.captures(text)?;
    let qty = caps[1].parse::<f64>().ok()?;

    Some(ParsedIngredient {
        name: caps[3].trim().to_string(),
        qty_numeric: Some(qty),
        unit: caps[2].to_string(),
        qty_text: text.to_string(),
    })
}

fn trailing_quantity(text: &str) -> Option<ParsedIngredient> {
    let caps = TRAILING_QTY.captures(text)?;
    let qty = parse_quantity(&caps[2])?;

    Some(ParsedIngredient {
        name: caps[1].trim().to_string(),
        qty_numeric: Some(qty),
        unit: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        qty_text: text.to_string(),
    })
}

/// Convert a quantity token (`2`, `0.5`, `.5`, `1/2`, `1 1/2`) to a number.
///
/// A zero denominator is not a quantity.
pub fn parse_quantity(token: &str) -> Option<f64> {
    let token = token.trim();

    if let Some((whole, fraction)) = token.split_once(char::is_whitespace) {
        return Some(whole.parse::<f64>().ok()? + parse_quantity(fraction)?);
    }

    match token.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => token.parse::<f64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_numeric_quantity() {
        let parsed = parse(&json!({"name": "Rice", "qty": 1.5, "unit": "cup"}));
        assert_eq!(parsed.name, "Rice");
        assert_eq!(parsed.qty_numeric, Some(1.5));
        assert_eq!(parsed.unit, "cup");
        assert_eq!(parsed.qty_text, "");
    }

    #[test]
    fn test_structured_text_quantity_recovers_unit() {
        let parsed = parse(&json!({"item": "Flour", "quantity": "about 2 cups"}));
        assert_eq!(parsed.name, "Flour");
        assert_eq!(parsed.qty_numeric, Some(2.0));
        assert_eq!(parsed.unit, "cups");
        assert_eq!(parsed.qty_text, "about 2 cups");
    }

    #[test]
    fn test_structured_fraction_quantity() {
        let parsed = parse(&json!({"name": "Flour", "qty": "1/2 cup"}));
        assert_eq!(parsed.qty_numeric, Some(0.5));
        assert_eq!(parsed.unit, "cup");
        assert_eq!(parsed.qty_text, "1/2 cup");

        let parsed = parse(&json!({"name": "Flour", "quantity": "1 1/2 cups"}));
        assert_eq!(parsed.qty_numeric, Some(1.5));
        assert_eq!(parsed.unit, "cups");

        let parsed = parse(&json!({"name": "Flour", "qty": "1/0 cup"}));
        assert_eq!(parsed.qty_numeric, Some(1.0));
    }

    #[test]
    fn test_structured_explicit_unit_wins() {
        let parsed = parse(&json!({"label": "Milk", "amount": "250 ml", "measure": "millilitres"}));
        assert_eq!(parsed.qty_numeric, Some(250.0));
        assert_eq!(parsed.unit, "millilitres");
    }

    #[test]
    fn test_structured_text_quantity_without_number() {
        let parsed = parse(&json!({"name": "Salt", "qty": "to taste"}));
        assert_eq!(parsed.qty_numeric, None);
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.qty_text, "to taste");
    }

    #[test]
    fn test_structured_nested_name() {
        let parsed = parse(&json!({"ingredient": {"label": "Basil"}, "qty": 3}));
        assert_eq!(parsed.name, "Basil");
        assert_eq!(parsed.qty_numeric, Some(3.0));
    }

    #[test]
    fn test_text_quantity_unit_name() {
        let parsed = parse(&json!("1 cup rice"));
        assert_eq!(parsed.name, "rice");
        assert_eq!(parsed.qty_numeric, Some(1.0));
        assert_eq!(parsed.unit, "cup");
    }

    #[test]
    fn test_text_fraction_and_dash_separator() {
        let parsed = parse_text("1/2 tsp turmeric");
        assert_eq!(parsed.qty_numeric, Some(0.5));
        assert_eq!(parsed.unit, "tsp");
        assert_eq!(parsed.name, "turmeric");

        let parsed = parse_text("2-eggs");
        assert_eq!(parsed.qty_numeric, Some(2.0));
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "eggs");

        let parsed = parse_text("2—eggs");
        assert_eq!(parsed.qty_numeric, Some(2.0));
        assert_eq!(parsed.name, "eggs");

        let parsed = parse_text("3–onions");
        assert_eq!(parsed.qty_numeric, Some(3.0));
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "onions");
    }

    #[test]
    fn test_text_mixed_number() {
        let parsed = parse_text("1 1/2 cups flour");
        assert_eq!(parsed.qty_numeric, Some(1.5));
        assert_eq!(parsed.unit, "cups");
        assert_eq!(parsed.name, "flour");
    }

    #[test]
    fn test_text_tab_separated_falls_to_second_pattern() {
        let parsed = parse_text("3\ttbsp  butter");
        assert_eq!(parsed.qty_numeric, Some(3.0));
        assert_eq!(parsed.unit, "tbsp");
        assert_eq!(parsed.name, "butter");
    }

    #[test]
    fn test_text_trailing_quantity() {
        let parsed = parse_text("Sugar 2 tbsp");
        assert_eq!(parsed.name, "Sugar");
        assert_eq!(parsed.qty_numeric, Some(2.0));
        assert_eq!(parsed.unit, "tbsp");

        let parsed = parse_text("Eggs 3");
        assert_eq!(parsed.name, "Eggs");
        assert_eq!(parsed.qty_numeric, Some(3.0));
        assert_eq!(parsed.unit, "");
    }

    #[test]
    fn test_text_without_number() {
        let parsed = parse_text("Water");
        assert_eq!(parsed.name, "Water");
        assert_eq!(parsed.qty_text, "Water");
        assert_eq!(parsed.qty_numeric, None);
        assert_eq!(parsed.unit, "");
    }

    #[test]
    fn test_zero_denominator_is_not_a_quantity() {
        assert_eq!(parse_quantity("1/0"), None);
        let parsed = parse_text("1/0 cup");
        assert_eq!(parsed.qty_numeric, None);
        assert_eq!(parsed.name, "1/0 cup");
    }

    #[test]
    fn test_other_values_are_stringified() {
        let parsed = parse(&json!(42));
        assert_eq!(parsed.name, "42");
        assert_eq!(parsed.qty_text, "42");
        assert_eq!(parsed.qty_numeric, None);
    }
}
