//! Property-based tests for accessor path parsing.
//!
//! Uses proptest to generate random queries and verify parser invariants.

use proptest::prelude::*;

use session_mirror_core::{strip_selector, AccessorPath, PathScope, SELECTORS};

/// Generate an identifier-like segment.
fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z.][A-Za-z0-9._]{0,8}"
}

/// Generate a selector character.
fn selector() -> impl Strategy<Value = char> {
    prop_oneof![Just('$'), Just('@')]
}

/// Generate a well-formed accessor chain such as `a$b@c`.
fn chain() -> impl Strategy<Value = (String, Vec<(char, String)>)> {
    (
        segment(),
        prop::collection::vec((selector(), segment()), 1..5),
    )
}

proptest! {
    /// Parsing never panics, whatever the input.
    #[test]
    fn parse_never_panics(input in "\\PC{0,32}") {
        let _ = AccessorPath::parse(&input);
    }

    /// Inputs without selectors are global and keep the whole text as filter.
    #[test]
    fn selector_free_input_is_global(input in "[A-Za-z0-9._ ]{0,20}") {
        let path = AccessorPath::parse(&input);
        prop_assert_eq!(path.scope(), PathScope::Global);
        prop_assert_eq!(path.filter(), input.as_str());
        prop_assert_eq!(path.base_expression(), None);
    }

    /// Inputs made only of selectors are degenerate.
    #[test]
    fn selector_only_input_is_degenerate(selectors in prop::collection::vec(selector(), 1..6)) {
        let input: String = selectors.into_iter().collect();
        let path = AccessorPath::parse(&input);
        prop_assert_eq!(path.scope(), PathScope::Degenerate);
        prop_assert!(path.tokens().is_empty());
    }

    /// Base expression plus selector plus filter reassembles the input.
    #[test]
    fn nested_parts_reassemble_input((head, rest) in chain()) {
        let mut input = head;
        for (sel, seg) in &rest {
            input.push(*sel);
            input.push_str(seg);
        }

        let path = AccessorPath::parse(&input);
        prop_assert_eq!(path.scope(), PathScope::Nested);

        let base = path.base_expression().unwrap_or_default();
        let sel = path.selector().unwrap_or_default();
        let rebuilt = format!("{base}{sel}{}", path.filter());
        prop_assert_eq!(rebuilt, input);

        let (last_sel, last_seg) = rest.last().cloned().unwrap_or_default();
        prop_assert_eq!(sel, last_sel);
        prop_assert_eq!(path.filter(), last_seg.as_str());
        prop_assert!(!path.filter().contains(SELECTORS));
    }

    /// A trailing selector means "all members": the filter is empty.
    #[test]
    fn trailing_selector_matches_everything(base in segment(), sel in selector(), member in segment()) {
        let input = format!("{base}{sel}");
        let path = AccessorPath::parse(&input);
        prop_assert_eq!(path.scope(), PathScope::Nested);
        prop_assert_eq!(path.base_expression(), Some(base.as_str()));
        prop_assert!(path.matches(&member));
    }

    /// Stripping removes exactly one selector.
    #[test]
    fn strip_selector_removes_one_prefix(sel in selector(), name in segment()) {
        let prefixed = format!("{sel}{name}");
        prop_assert_eq!(strip_selector(&prefixed), name.as_str());
        prop_assert_eq!(strip_selector(&name), name.as_str());
    }
}
