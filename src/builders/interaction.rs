//! Interaction builder.

use serde_json::Value;
use tracing::debug;

use super::EntityBuilder;
use crate::entity::FieldValue;
use crate::extraction::{keys, resolve, resolve_text, Extractor};
use crate::ids::{IdGenerator, IdPrefixes};
use crate::models::Interaction;
use crate::timestamp;

/// The only interaction type that carries a rating.
pub const COOK: &str = "cook";

#[derive(Debug, Clone, Default)]
pub struct InteractionBuilder {
    prefixes: IdPrefixes,
}

impl InteractionBuilder {
    pub fn new(prefixes: IdPrefixes) -> Self {
        Self { prefixes }
    }
}

impl EntityBuilder for InteractionBuilder {
    type Output = Interaction;

    fn name(&self) -> &'static str {
        "interaction"
    }

    fn build(&self, record: &Value, ids: &mut dyn IdGenerator) -> Interaction {
        let mut interaction_id = resolve_text(record, keys::INTERACTION_ID);
        if interaction_id.is_empty() {
            interaction_id = ids.next_id(&self.prefixes.interaction);
            debug!("Generated interaction id {}", interaction_id);
        }

        let interaction_type = resolve_text(record, keys::INTERACTION_TYPE);

        // Ratings on anything but a cook are dropped, not carried.
        let rating = if interaction_type == COOK {
            record
                .resolve(keys::RATING)
                .map(FieldValue::from_json)
                .unwrap_or_default()
        } else {
            FieldValue::Null
        };

        Interaction {
            interaction_id,
            user_id: resolve_text(record, keys::USER_ID),
            recipe_id: resolve_text(record, keys::INTERACTION_RECIPE_ID),
            interaction_type,
            rating,
            timestamp: timestamp::normalize(&resolve(record, keys::TIMESTAMP, Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use serde_json::json;

    fn build(record: Value) -> Interaction {
        let mut ids = SequentialIdGenerator::new();
        InteractionBuilder::default().build(&record, &mut ids)
    }

    #[test]
    fn test_fallback_keys_and_generated_id() {
        let interaction = build(json!({"user": "U1", "recipe": "R1", "type": "cook", "score": 6}));

        assert_eq!(interaction.interaction_id, "I_00000001");
        assert_eq!(interaction.user_id, "U1");
        assert_eq!(interaction.recipe_id, "R1");
        assert_eq!(interaction.interaction_type, "cook");
        assert_eq!(interaction.rating, FieldValue::Int(6));
    }

    #[test]
    fn test_rating_dropped_for_non_cook() {
        let interaction = build(json!({
            "interaction_id": "I9",
            "userId": "U2",
            "recipeId": "R2",
            "action": "like",
            "rating": 4
        }));

        assert_eq!(interaction.interaction_id, "I9");
        assert_eq!(interaction.interaction_type, "like");
        assert_eq!(interaction.rating, FieldValue::Null);
    }

    #[test]
    fn test_interaction_prefix_from_id_prefixes() {
        let prefixes = IdPrefixes {
            interaction: "EVT".to_string(),
            ..Default::default()
        };
        let mut ids = SequentialIdGenerator::new();
        let interaction = InteractionBuilder::new(prefixes).build(&json!({"type": "view"}), &mut ids);
        assert_eq!(interaction.interaction_id, "EVT_00000001");
    }

    #[test]
    fn test_timestamp_normalized() {
        let interaction = build(json!({"id": "I1", "type": "view", "createdAt": "2024-05-01T08:00:00Z"}));
        assert_eq!(interaction.timestamp, "2024-05-01T08:00:00+00:00");
    }
}
