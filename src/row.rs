use std::collections::HashMap;

use crate::rich::{Align, Rich};

/// One record: field names mapped to values, in the order the fields were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Rich)>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    /// Lift a record of plain strings, every field becoming a string value.
    pub fn from_raw<K, V>(raw: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Row::new();
        for (key, value) in raw {
            let value: String = value.into();
            row.insert(key, Rich::from(value));
        }
        row
    }

    /// Add a field, replacing the value of an existing one in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Rich) {
        let key = key.into();
        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Rich>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Rich> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Rich> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Display text of a field; empty when the field is absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(Rich::to_string).unwrap_or_default()
    }

    /// Re-interpret an existing field from its current text.
    pub fn convert(&mut self, key: &str, kind: impl FnOnce(String) -> Rich) {
        if let Some(value) = self.get_mut(key) {
            *value = kind(value.to_string());
        }
    }

    /// Color every field.
    pub fn paint(&mut self, color: &str) {
        for (_, value) in &mut self.fields {
            value.color = color.to_string();
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rich)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Layout hints for one column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    /// Width the column is never shrunk below, unless it is dropped.
    pub min_width: usize,
    pub align: Align,
    /// Columns with priority get leftover room first.
    pub priority: bool,
    pub default_visible: bool,
}

impl Column {
    pub fn new(key: impl Into<String>, min_width: usize, align: Align, priority: bool) -> Self {
        Column {
            key: key.into(),
            min_width,
            align,
            priority,
            default_visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }
}

/// Header text per column key.
#[derive(Debug, Clone, Default)]
pub struct Header {
    names: HashMap<String, Rich>,
}

impl Header {
    pub fn new() -> Self {
        Header::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, name: Rich) {
        self.names.insert(key.into(), name);
    }

    /// Header for `key`, falling back to the key itself.
    pub fn name(&self, key: &str) -> Rich {
        self.names
            .get(key)
            .cloned()
            .unwrap_or_else(|| Rich::string(key))
    }

    pub fn paint(&mut self, key: &str, color: &str) {
        if let Some(name) = self.names.get_mut(key) {
            name.color = color.to_string();
        }
    }
}
