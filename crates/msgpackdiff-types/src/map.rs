//! Ordered, string-keyed map.
//!
//! MessagePack maps are sequences of key/value pairs. Key order matters for
//! order-sensitive comparison, so the map keeps the encounter order next to
//! the lookup table.
//!
//! # Invariants
//!
//! - Every key in `order` appears exactly once in `entries` and vice versa.
//! - `order.len() == entries.len()`.

use std::collections::HashMap;

use crate::error::TypeError;
use crate::value::Value;

/// A map that preserves the order in which keys were first encountered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderedMap {
    /// Keys in encounter order.
    order: Vec<String>,
    /// Key to value lookup.
    entries: HashMap<String, Value>,
}

impl OrderedMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Build a map from pairs, failing on the first repeated key.
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self, TypeError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    /// Append a new entry.
    ///
    /// Returns [`TypeError::DuplicateKey`] if the key is already present; the
    /// map is left unchanged in that case.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<(), TypeError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(TypeError::DuplicateKey(key));
        }
        self.order.push(key.clone());
        self.entries.insert(key, value);
        Ok(())
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in encounter order.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// The key at `index` in encounter order.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    /// The entry at `index` in encounter order.
    pub fn get_index(&self, index: usize) -> Option<(&str, &Value)> {
        let key = self.order.get(index)?;
        self.entries.get(key).map(|value| (key.as_str(), value))
    }

    /// Entries in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key.as_str(), value)))
    }

    /// Values in encounter order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|(_, value)| value)
    }
}
