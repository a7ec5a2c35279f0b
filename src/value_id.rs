//! Value identifier module.
//!
//! Provides the `ValueId` type, an interned string identifier for named
//! sheet values. Construction normalizes the name (lowercase, whitespace
//! removed) so that `"Creo Exp"`, `"CREO EXP"`, and `"creoexp"` all name
//! the same value. Uses `Arc<str>` for cheap cloning and fast comparison.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Interned, normalized identifier for a named sheet value.
///
/// Names are normalized on construction: every character is lowercased and
/// all whitespace is removed. Lookups, dependency edges, and callbacks all
/// key on the normalized form, which is what makes user-facing spellings
/// interchangeable.
///
/// # Examples
///
/// ```rust
/// use charsheet::ValueId;
///
/// let a = ValueId::new("Creo Exp");
/// let b = ValueId::new("CREO EXP");
/// let c: ValueId = "creoexp".into();
///
/// assert_eq!(a, b);
/// assert_eq!(a, c);
/// assert_eq!(a.as_str(), "creoexp");
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValueId(Arc<str>);

impl ValueId {
    /// Create a new `ValueId`, normalizing the given name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use charsheet::ValueId;
    ///
    /// let id = ValueId::new("Lab Total");
    /// assert_eq!(id.as_str(), "labtotal");
    /// ```
    pub fn new(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        Self(Arc::from(normalized))
    }

    /// Get the normalized string form of this id.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use charsheet::ValueId;
    ///
    /// let id = ValueId::new("Creo");
    /// assert_eq!(id.as_str(), "creo");
    /// ```
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the normalized name is empty.
    ///
    /// A name consisting only of whitespace normalizes to the empty id,
    /// which no store operation accepts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ValueId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ValueId::new(&s))
    }
}

impl From<&str> for ValueId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ValueId {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
