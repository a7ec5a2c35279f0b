//! Campaign-level state consulted as a fallback value source.
//!
//! A sheet resolves references against its own values first; anything it
//! does not know is looked up here. The core does not interpret these
//! numbers; covenant aura, seasonal modifiers, house rules, whatever the
//! campaign tracks — they are simply name→value pairs the host supplies.

use crate::eval::ValueLookup;
use crate::value_id::ValueId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name→value map for state that lives outside any one character.
///
/// Keys normalize the same way sheet names do, so `"Aura"` and `"aura"`
/// are the same entry.
///
/// # Examples
///
/// ```rust
/// use charsheet::{CharacterSheet, GameContext};
///
/// let mut context = GameContext::new();
/// context.set("Aura", 3.0);
///
/// let mut sheet = CharacterSheet::new();
/// sheet.set_value("Creo", 6.0, &context).unwrap();
/// sheet
///     .set_expression("Casting Total", "[Creo] + [Aura]", &context)
///     .unwrap();
///
/// assert_eq!(sheet.get_value("casting total", &context).unwrap(), Some(9.0));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameContext {
    values: HashMap<ValueId, f64>,
}

impl GameContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, creating the entry if needed.
    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(ValueId::new(name), value);
    }

    /// Get a value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(&ValueId::new(name)).copied()
    }

    /// Whether the context holds the name.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&ValueId::new(name))
    }

    /// Remove a value, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(&ValueId::new(name))
    }
}

impl ValueLookup for GameContext {
    fn lookup(&self, name: &ValueId) -> Option<f64> {
        self.values.get(name).copied()
    }
}
