//! Snapshot of the session's global variables.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use session_mirror_core::{ValueDescriptor, VariableDescriptor};

/// Global variables as of one refresh.
///
/// Built in one piece from one refresh round and never mutated afterwards;
/// the mirror swaps whole snapshots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    generation: u64,
    refreshed_at: Option<DateTime<Utc>>,
    variables: IndexMap<String, VariableDescriptor>,
}

impl SessionSnapshot {
    /// Snapshot before any refresh succeeded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from the children of the global environment.
    ///
    /// Order follows the remote enumeration. A repeated name keeps its first
    /// position and the last descriptor.
    pub fn from_values(generation: u64, values: &[ValueDescriptor]) -> Self {
        let mut variables = IndexMap::with_capacity(values.len());
        for value in values {
            let variable = VariableDescriptor::from_value(value);
            variables.insert(variable.name().to_string(), variable);
        }

        Self {
            generation,
            refreshed_at: Some(Utc::now()),
            variables,
        }
    }

    /// Refresh round this snapshot came from, 0 before the first refresh.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the snapshot was built.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Number of variables, hidden ones included.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the snapshot has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.get(name)
    }

    /// All variables in refresh order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variables.values()
    }

    /// Non-hidden variables in refresh order.
    pub fn visible(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.iter().filter(|variable| !variable.is_hidden())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_mirror_core::VariableKind;

    fn values() -> Vec<ValueDescriptor> {
        vec![
            ValueDescriptor::new("x").with_type("double"),
            ValueDescriptor::new("f").with_type("closure"),
            ValueDescriptor::new(".tmp").with_type("double"),
        ]
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = SessionSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation(), 0);
        assert_eq!(snapshot.refreshed_at(), None);
    }

    #[test]
    fn test_from_values_keeps_order() {
        let snapshot = SessionSnapshot::from_values(3, &values());
        let names: Vec<&str> = snapshot.iter().map(|v| v.name()).collect();
        assert_eq!(names, ["x", "f", ".tmp"]);
        assert_eq!(snapshot.generation(), 3);
        assert!(snapshot.refreshed_at().is_some());
    }

    #[test]
    fn test_visible_skips_hidden() {
        let snapshot = SessionSnapshot::from_values(1, &values());
        let names: Vec<&str> = snapshot.visible().map(|v| v.name()).collect();
        assert_eq!(names, ["x", "f"]);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_kinds() {
        let snapshot = SessionSnapshot::from_values(1, &values());
        assert_eq!(snapshot.get("f").map(|v| v.kind()), Some(VariableKind::Function));
        assert_eq!(snapshot.get("x").map(|v| v.kind()), Some(VariableKind::Variable));
        assert!(snapshot.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_last_write_wins() {
        let values = vec![
            ValueDescriptor::new("x").with_type("double"),
            ValueDescriptor::new("y").with_type("double"),
            ValueDescriptor::new("x").with_type("closure"),
        ];
        let snapshot = SessionSnapshot::from_values(1, &values);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("x").map(|v| v.kind()), Some(VariableKind::Function));
        let names: Vec<&str> = snapshot.iter().map(|v| v.name()).collect();
        assert_eq!(names, ["x", "y"]);
    }
}
