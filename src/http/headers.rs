//! Multi-value maps for headers and query string parameters.

use std::collections::HashMap;

/// A map from name to one or more values.
///
/// Front doors disagree on how repeated headers and query parameters are
/// delivered: REST APIs and ALB may send both `headers` and
/// `multiValueHeaders`, HTTP APIs only a single comma-joined value. The map
/// keeps every value in arrival order; the single-value view is the last one.
///
/// Header maps fold names to lowercase so lookups are case-insensitive.
/// Query maps keep names as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiValueMap {
    entries: HashMap<String, Vec<String>>,
    fold_case: bool,
}

impl MultiValueMap {
    /// Create a case-sensitive map (query parameters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a case-insensitive map (headers).
    pub fn case_insensitive() -> Self {
        Self {
            entries: HashMap::new(),
            fold_case: true,
        }
    }

    fn key(&self, name: &str) -> String {
        if self.fold_case {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Append a value for `name`.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let key = self.key(name);
        self.entries.entry(key).or_default().push(value.into());
    }

    /// Replace all values for `name` with a single value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let key = self.key(name);
        self.entries.insert(key, vec![value.into()]);
    }

    /// Insert `values` for `name` unless the name is already present.
    ///
    /// Used to merge the single-value view of an event into the multi-value
    /// one without duplicating entries the front door sent twice.
    pub fn insert_missing(&mut self, name: &str, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        let key = self.key(name);
        self.entries.entry(key).or_insert(values);
    }

    /// Get the single value for `name`. The last value wins on duplicates.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).last().map(String::as_str)
    }

    /// Get every value for `name`, in arrival order.
    pub fn get_all(&self, name: &str) -> &[String] {
        let found = if self.fold_case {
            self.entries.get(&name.to_ascii_lowercase())
        } else {
            self.entries.get(name)
        };
        found.map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Iterate over the single-value view.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.last().map(|last| (k.as_str(), last.as_str())))
    }

    /// Iterate over the multi-value view.
    pub fn iter_all(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Collect the single-value view into a plain map.
    pub fn to_single_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
