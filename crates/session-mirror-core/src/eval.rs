//! Value shapes exchanged with the remote evaluation session.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::accessor::SELECTORS;

/// How a child member is addressed inside its parent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessorKind {
    /// Named member reached with `$`
    Dollar,
    /// Slot reached with `@`
    At,
    /// Positional element (`[[1]]`)
    Positional,
    /// Anything else (environment bindings, attributes)
    #[default]
    Other,
}

impl AccessorKind {
    /// Selector character used to reach a member of this kind, if any.
    pub fn selector(&self) -> Option<char> {
        match self {
            AccessorKind::Dollar => Some(SELECTORS[0]),
            AccessorKind::At => Some(SELECTORS[1]),
            AccessorKind::Positional | AccessorKind::Other => None,
        }
    }

    /// Whether members of this kind complete by name after a selector.
    pub fn is_named(&self) -> bool {
        self.selector().is_some()
    }
}

bitflags! {
    /// Descriptive properties requested from the remote side for each value.
    ///
    /// The remote side only fills in what was asked for; unrequested
    /// fields of a [`ValueDescriptor`] come back empty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u16 {
        /// Expression that re-evaluates to the value
        const EXPRESSION = 1 << 0;
        /// Accessor kind relative to the parent
        const ACCESSOR_KIND = 1 << 1;
        /// Type name (`closure`, `double`, `list`, ...)
        const TYPE_NAME = 1 << 2;
        /// Class vector
        const CLASSES = 1 << 3;
        /// Length
        const LENGTH = 1 << 4;
        /// Number of slots
        const SLOT_COUNT = 1 << 5;
        /// Number of attributes
        const ATTRIBUTE_COUNT = 1 << 6;
        /// Dimensions
        const DIMENSIONS = 1 << 7;
        /// Value flags (atomic, recursive, has parent env)
        const FLAGS = 1 << 8;
        /// Whether the value has children to expand
        const HAS_CHILDREN = 1 << 9;

        /// Property set used when mirroring the global environment.
        const GLOBAL_ENVIRONMENT = Self::EXPRESSION.bits()
            | Self::ACCESSOR_KIND.bits()
            | Self::TYPE_NAME.bits()
            | Self::CLASSES.bits()
            | Self::LENGTH.bits()
            | Self::SLOT_COUNT.bits()
            | Self::ATTRIBUTE_COUNT.bits()
            | Self::DIMENSIONS.bits()
            | Self::FLAGS.bits();

        /// Property set used for nested member completion.
        const MEMBER_COMPLETION = Self::HAS_CHILDREN.bits() | Self::ACCESSOR_KIND.bits();
    }
}

/// Representation hint for the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// No textual representation
    #[default]
    None,
    /// Compact `str()`-style text, truncated to `max_length` characters
    Str {
        /// Maximum length of the produced text
        max_length: usize,
    },
}

/// One frame of the remote call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Frame index, 0 being the outermost frame
    pub index: usize,
    /// Call text of the frame, if any
    #[serde(default)]
    pub call: Option<String>,
    /// Whether this frame evaluates in the global environment
    #[serde(default)]
    pub is_global: bool,
}

impl StackFrame {
    /// Create a new frame.
    pub fn new(index: usize, is_global: bool) -> Self {
        Self {
            index,
            call: None,
            is_global,
        }
    }

    /// Set the call text.
    pub fn with_call(mut self, call: impl Into<String>) -> Self {
        self.call = Some(call.into());
        self
    }
}

/// Description of a remote value, as returned by the evaluation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValueDescriptor {
    /// Name relative to the parent. Child names carry their accessor
    /// prefix (`$col1`, `@slot`, `[[1]]`); environment bindings are bare.
    pub name: String,
    /// Expression that re-evaluates to the value
    pub expression: Option<String>,
    /// Accessor kind relative to the parent
    pub accessor_kind: AccessorKind,
    /// Type name
    pub type_name: Option<String>,
    /// Class vector
    pub classes: Vec<String>,
    /// Length
    pub length: Option<u64>,
    /// Number of slots
    pub slot_count: Option<u64>,
    /// Number of attributes
    pub attribute_count: Option<u64>,
    /// Dimensions, empty for dimensionless values
    pub dimensions: Vec<u64>,
    /// Whether the value has children
    pub has_children: bool,
    /// Textual representation, if requested
    pub representation: Option<String>,
}

impl ValueDescriptor {
    /// Create a descriptor with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the type name.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the accessor kind.
    pub fn with_accessor(mut self, kind: AccessorKind) -> Self {
        self.accessor_kind = kind;
        self
    }

    /// Mark the value as expandable.
    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    /// Set the expression.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_selectors() {
        assert_eq!(AccessorKind::Dollar.selector(), Some('$'));
        assert_eq!(AccessorKind::At.selector(), Some('@'));
        assert_eq!(AccessorKind::Positional.selector(), None);
        assert!(!AccessorKind::Other.is_named());
    }

    #[test]
    fn test_global_environment_flags() {
        let flags = PropertyFlags::GLOBAL_ENVIRONMENT;
        assert!(flags.contains(PropertyFlags::TYPE_NAME));
        assert!(flags.contains(PropertyFlags::DIMENSIONS));
        assert!(!flags.contains(PropertyFlags::HAS_CHILDREN));
    }

    #[test]
    fn test_member_completion_flags() {
        let flags = PropertyFlags::MEMBER_COMPLETION;
        assert_eq!(
            flags,
            PropertyFlags::HAS_CHILDREN | PropertyFlags::ACCESSOR_KIND
        );
    }

    #[test]
    fn test_descriptor_builder() {
        let value = ValueDescriptor::new("$a")
            .with_accessor(AccessorKind::Dollar)
            .with_type("double")
            .with_children();
        assert_eq!(value.name, "$a");
        assert_eq!(value.type_name.as_deref(), Some("double"));
        assert!(value.has_children);
    }

    #[test]
    fn test_descriptor_deserialize_defaults() {
        let json = r#"{"name": "$col1", "accessor_kind": "dollar"}"#;
        let value: ValueDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(value.accessor_kind, AccessorKind::Dollar);
        assert!(value.classes.is_empty());
        assert_eq!(value.type_name, None);
    }

    #[test]
    fn test_stack_frame() {
        let frame = StackFrame::new(0, true).with_call("<toplevel>");
        assert!(frame.is_global);
        assert_eq!(frame.call.as_deref(), Some("<toplevel>"));
    }
}
