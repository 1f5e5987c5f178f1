//! Mirrored variables and completion candidates.

use serde::{Deserialize, Serialize};

use crate::ValueDescriptor;

/// Type names the session reports for callable values.
const FUNCTION_TYPE_NAMES: [&str; 2] = ["closure", "builtin"];

/// Kind of a global variable or completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Plain value
    Variable,
    /// Callable value
    Function,
}

impl VariableKind {
    /// Classify a remote type name.
    ///
    /// Exact, case-sensitive match: only `closure` and `builtin` are functions.
    pub fn from_type_name(type_name: &str) -> Self {
        if FUNCTION_TYPE_NAMES.contains(&type_name) {
            VariableKind::Function
        } else {
            VariableKind::Variable
        }
    }
}

/// A top-level variable of the remote session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    name: String,
    kind: VariableKind,
    is_hidden: bool,
}

impl VariableDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, kind: VariableKind, is_hidden: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            is_hidden,
        }
    }

    /// Build a descriptor from a child of the global environment.
    ///
    /// Names starting with `.` are hidden bindings.
    pub fn from_value(value: &ValueDescriptor) -> Self {
        let kind = value
            .type_name
            .as_deref()
            .map(VariableKind::from_type_name)
            .unwrap_or(VariableKind::Variable);
        Self::new(value.name.clone(), kind, value.name.starts_with('.'))
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variable kind.
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Whether the variable is hidden from completion.
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }
}

/// A single completion suggestion returned to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCandidate {
    /// Text shown and inserted
    pub display_name: String,
    /// Description shown next to the name
    pub description: String,
    /// Candidate kind
    pub kind: VariableKind,
}

impl CompletionCandidate {
    /// Create a candidate with an empty description.
    pub fn new(display_name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            display_name: display_name.into(),
            description: String::new(),
            kind,
        }
    }
}

impl From<&VariableDescriptor> for CompletionCandidate {
    fn from(variable: &VariableDescriptor) -> Self {
        Self::new(variable.name(), variable.kind())
    }
}
