use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque key/value fields returned by a WHOIS service
///
/// Rendered transiently and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhoisRecord {
    fields: BTreeMap<String, String>,
}

impl WhoisRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, appending on a new line when the key repeats
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        self.fields
            .entry(key.into())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
