//! Accessor path parsing for member completion.
//!
//! A completion query is the partially typed expression left of the cursor,
//! e.g. `df$co` or `obj@sl`. Parsing splits it into the base expression that
//! must be evaluated remotely (`df`) and the prefix that filters the returned
//! members locally (`co`). Parsing is pure and never fails: inputs that cannot
//! name anything are classified as [`PathScope::Degenerate`].

use serde::{Deserialize, Serialize};

/// Characters that select a member of a value: `$` (named) and `@` (slot).
pub const SELECTORS: [char; 2] = ['$', '@'];

/// Scope a completion query resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathScope {
    /// Top-level variables of the session
    Global,
    /// Members of a remotely evaluated base expression
    Nested,
    /// Nothing to complete (`$`, `$$`, `@$`)
    Degenerate,
}

/// A parsed completion query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorPath {
    raw: String,
    tokens: Vec<String>,
    scope: PathScope,
    base_expression: Option<String>,
    selector: Option<char>,
    filter: String,
}

impl AccessorPath {
    /// Parse a completion query.
    ///
    /// Examples:
    /// - "" -> Global, filter ""
    /// - "pri" -> Global, filter "pri"
    /// - "df$" -> Nested, base "df", filter ""
    /// - "a$b@c" -> Nested, base "a$b", selector '@', filter "c"
    /// - "$$" -> Degenerate
    pub fn parse(input: &str) -> Self {
        let tokens: Vec<String> = input
            .split(SELECTORS)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        let last_selector = input
            .char_indices()
            .rev()
            .find(|(_, c)| SELECTORS.contains(c));

        let Some((index, selector)) = last_selector else {
            return Self {
                raw: input.to_string(),
                tokens,
                scope: PathScope::Global,
                base_expression: None,
                selector: None,
                filter: input.to_string(),
            };
        };

        if tokens.is_empty() {
            return Self {
                raw: input.to_string(),
                tokens,
                scope: PathScope::Degenerate,
                base_expression: None,
                selector: None,
                filter: String::new(),
            };
        }

        Self {
            raw: input.to_string(),
            tokens,
            scope: PathScope::Nested,
            base_expression: Some(input[..index].to_string()),
            selector: Some(selector),
            filter: input[index + selector.len_utf8()..].to_string(),
        }
    }

    /// The unparsed query.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Non-empty segments between selectors.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Scope the query resolves against.
    pub fn scope(&self) -> PathScope {
        self.scope
    }

    /// Expression to evaluate remotely (nested scope only).
    pub fn base_expression(&self) -> Option<&str> {
        self.base_expression.as_deref()
    }

    /// The last selector character (nested scope only).
    pub fn selector(&self) -> Option<char> {
        self.selector
    }

    /// Text after the last selector, or the whole query in global scope.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Whether a member name passes the local prefix filter.
    pub fn matches(&self, member_name: &str) -> bool {
        member_name.starts_with(self.filter.as_str())
    }
}

/// Strip one leading selector character from a remote member name.
///
/// `$col1` -> `col1`, `@slot` -> `slot`, `x` -> `x`.
pub fn strip_selector(name: &str) -> &str {
    name.strip_prefix(SELECTORS).unwrap_or(name)
}
