//! The accumulator threaded through every traversal: a set of external
//! variable names.

use std::collections::BTreeSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// The set of external variable names collected by one analysis.
///
/// Every traversal threads a `&mut UsedVariables` through its recursive
/// calls; exactly one accumulator belongs to one analysis. Recording a name
/// that is already present is a no-op, so re-running a traversal into the
/// same accumulator never changes the result. Batch callers analyzing many
/// offers should give each analysis its own accumulator and [`merge`] the
/// results afterwards.
///
/// Serializes as a `{"name": true, ...}` map, the shape the platform stores.
///
/// [`merge`]: UsedVariables::merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedVariables(BTreeSet<String>);

impl UsedVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a variable name. Idempotent.
    pub fn record(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Removes `name` from the set, reporting whether it was present.
    ///
    /// Used for scenario placeholders: once a slot is expanded, its
    /// placeholder is no longer a real data dependency.
    pub fn consume(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    /// Set union with the result of another analysis.
    pub fn merge(&mut self, other: UsedVariables) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Variable names in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for UsedVariables {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for UsedVariables {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for UsedVariables {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for name in &self.0 {
            map.serialize_entry(name, &true)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_idempotent() {
        let mut used = UsedVariables::new();
        used.record("db.products.viewed");
        let before = used.clone();
        used.record("db.products.viewed");
        assert_eq!(used, before);
        assert_eq!(used.len(), 1);
    }

    #[test]
    fn test_consume_reports_presence() {
        let mut used: UsedVariables = ["products1", "x"].into_iter().collect();
        assert!(used.consume("products1"));
        assert!(!used.consume("products1"));
        assert_eq!(used, ["x"].into_iter().collect());
    }

    #[test]
    fn test_merge_is_set_union() {
        let mut a: UsedVariables = ["x", "y"].into_iter().collect();
        let b: UsedVariables = ["y", "z"].into_iter().collect();
        a.merge(b);
        assert_eq!(a, ["x", "y", "z"].into_iter().collect());
    }

    #[test]
    fn test_serializes_as_map_of_true() {
        let used: UsedVariables = ["db.varx", "lastEvent.url"].into_iter().collect();
        let json = serde_json::to_value(&used).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"db.varx": true, "lastEvent.url": true})
        );
    }
}
