//! The `(section, key) -> value` store

use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved section name for top-level options
pub const GLOBAL_SECTION: &str = "__global__";

/// Separator between the levels of a nested section name (`extractor.example`)
pub const SECTION_SEPARATOR: char = '.';

/// Layered configuration keyed by `(section, key)`
///
/// Sections are flat strings. Nesting is expressed with dotted names and only
/// matters to [`ConfigStore::interpolate`], which falls back from the most
/// specific section towards [`GLOBAL_SECTION`].
///
/// The store is an ordinary value: build one per run (or per test) and pass it
/// to whatever needs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    sections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently write `value` at `(section, key)`, returning what was there
    pub fn set(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Option<Value> {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value)
    }

    /// Get the value currently visible at `(section, key)`
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|entries| entries.get(key))
    }

    /// Get a value from [`GLOBAL_SECTION`]
    pub fn get_global(&self, key: &str) -> Option<&Value> {
        self.get(GLOBAL_SECTION, key)
    }

    /// Remove `(section, key)`, returning the removed value
    ///
    /// Sections left without entries are dropped so that a store reads the
    /// same after a set/unset pair as it did before.
    pub fn unset(&mut self, section: &str, key: &str) -> Option<Value> {
        let entries = self.sections.get_mut(section)?;
        let removed = entries.remove(key);
        if entries.is_empty() {
            self.sections.remove(section);
        }
        removed
    }

    /// Resolve `key` through the levels of a dotted `section`
    ///
    /// Looks in [`GLOBAL_SECTION`] first, then in every prefix of `section`
    /// (`a`, `a.b`, `a.b.c`, ...). The most specific hit wins.
    pub fn interpolate(&self, section: &str, key: &str) -> Option<&Value> {
        let mut found = self.get(GLOBAL_SECTION, key);

        if section.is_empty() || section == GLOBAL_SECTION {
            return found;
        }

        let mut end = 0;
        for part in section.split(SECTION_SEPARATOR) {
            end += part.len();
            if let Some(value) = self.get(&section[..end], key) {
                found = Some(value);
            }
            end += SECTION_SEPARATOR.len_utf8();
        }

        found
    }

    /// Number of stored paths
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// Whether the store holds no values
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get_round_trip() {
        let mut store = ConfigStore::new();
        assert_eq!(store.set(GLOBAL_SECTION, "base-directory", json!("/tmp")), None);
        assert_eq!(store.get_global("base-directory"), Some(&json!("/tmp")));

        let previous = store.set(GLOBAL_SECTION, "base-directory", json!("/srv"));
        assert_eq!(previous, Some(json!("/tmp")));
        assert_eq!(store.get(GLOBAL_SECTION, "base-directory"), Some(&json!("/srv")));
    }

    #[test]
    fn sections_are_independent() {
        let mut store = ConfigStore::new();
        store.set("output", "progress", json!(false));
        store.set(GLOBAL_SECTION, "progress", json!(true));

        assert_eq!(store.get("output", "progress"), Some(&json!(false)));
        assert_eq!(store.get_global("progress"), Some(&json!(true)));
        assert_eq!(store.get("extractor", "progress"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unset_drops_empty_sections() {
        let mut store = ConfigStore::new();
        store.set("plugin", "opt", json!(1));

        assert_eq!(store.unset("plugin", "opt"), Some(json!(1)));
        assert_eq!(store.unset("plugin", "opt"), None);
        assert!(store.is_empty());
        assert_eq!(store, ConfigStore::new());
    }

    #[test]
    fn interpolate_prefers_most_specific_section() {
        let mut store = ConfigStore::new();
        store.set(GLOBAL_SECTION, "retries", json!(4));
        store.set("extractor", "retries", json!(2));
        store.set("extractor.example", "retries", json!(1));

        assert_eq!(store.interpolate("extractor.example", "retries"), Some(&json!(1)));
        assert_eq!(store.interpolate("extractor.other", "retries"), Some(&json!(2)));
        assert_eq!(store.interpolate("output", "retries"), Some(&json!(4)));
        assert_eq!(store.interpolate(GLOBAL_SECTION, "retries"), Some(&json!(4)));
        assert_eq!(store.interpolate("extractor", "timeout"), None);
    }
}
