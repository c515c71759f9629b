//! Identifier generation for rows whose source carries no id.
//!
//! Generators are injected into the builders so tests can use deterministic
//! ids instead of random ones.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source of fresh identifiers.
pub trait IdGenerator {
    /// Return an id of the form `<prefix>_<suffix>`, never repeated by this
    /// generator.
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random ids: `<prefix>_` plus eight hex digits of a v4 UUID.
#[derive(Debug, Default)]
pub struct RandomIdGenerator {
    issued: HashSet<String>,
}

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self, prefix: &str) -> String {
        loop {
            let suffix = Uuid::new_v4().simple().to_string();
            let id = format!("{}_{}", prefix, &suffix[..8]);
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Deterministic ids: `<prefix>_00000001`, `<prefix>_00000002`, ...
///
/// The counter is shared across prefixes.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{}_{:08}", prefix, self.counter)
    }
}

/// Prefixes for generated ids, one per entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdPrefixes {
    pub recipe: String,
    pub ingredient: String,
    pub step: String,
    pub interaction: String,
}

impl Default for IdPrefixes {
    fn default() -> Self {
        Self {
            recipe: "R".to_string(),
            ingredient: "ING".to_string(),
            step: "STEP".to_string(),
            interaction: "I".to_string(),
        }
    }
}
