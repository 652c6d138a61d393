//! Wildcard-capable attribute matchers for single tree nodes.
//!
//! A [`Criteria`] carries up to four named attributes; absent attributes are
//! wildcards, so a fully-empty criteria matches every node. Multiple criteria
//! attached to one locator combine with OR semantics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::provider::NodeProps;

/// Control kind as reported by a tree provider.
///
/// `Unknown` is the unset value: a criteria whose kind is `Unknown` (or
/// absent) does not discriminate on kind at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Top-level or dialog window
    Window,
    /// Push button
    Button,
    /// Editable text field
    Edit,
    /// List container
    List,
    /// Single list entry
    ListItem,
    /// Scroll bar
    ScrollBar,
    /// Generic container pane
    Pane,
    /// Static text
    Text,
    /// Table/grid container
    Table,
    /// Menu entry
    MenuItem,
    /// Provider-specific kind outside the common set
    Custom(String),
    /// Kind not reported or not yet read
    Unknown,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window => write!(f, "Window"),
            Self::Button => write!(f, "Button"),
            Self::Edit => write!(f, "Edit"),
            Self::List => write!(f, "List"),
            Self::ListItem => write!(f, "ListItem"),
            Self::ScrollBar => write!(f, "ScrollBar"),
            Self::Pane => write!(f, "Pane"),
            Self::Text => write!(f, "Text"),
            Self::Table => write!(f, "Table"),
            Self::MenuItem => write!(f, "MenuItem"),
            Self::Custom(name) => write!(f, "{name}"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// An immutable set of attribute matchers tested against one node.
///
/// A criteria matches a node when every *present* attribute equals the
/// node's corresponding property. A criteria with no attributes set is the
/// "true condition": it matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    /// Accessible label to require, if any
    pub label: Option<String>,
    /// Automation identity to require, if any
    pub identity: Option<String>,
    /// Provider class name to require, if any
    pub class_name: Option<String>,
    /// Control kind to require, if any
    pub kind: Option<NodeKind>,
}

impl Criteria {
    /// The empty criteria: matches every node
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Criteria requiring an exact accessible label
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Criteria requiring an exact automation identity
    #[must_use]
    pub fn identity(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            ..Self::default()
        }
    }

    /// Criteria requiring an exact class name
    #[must_use]
    pub fn class_name(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// Criteria requiring a control kind
    #[must_use]
    pub fn kind(kind: NodeKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Add a label requirement
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add an identity requirement
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Add a class-name requirement
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Add a kind requirement
    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Whether no attribute is set, i.e. this is the true condition
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.label.is_none()
            && self.identity.is_none()
            && self.class_name.is_none()
            && self.kind_or_unset().is_none()
    }

    // A kind of Unknown discriminates nothing, same as an absent kind.
    fn kind_or_unset(&self) -> Option<&NodeKind> {
        match &self.kind {
            Some(NodeKind::Unknown) | None => None,
            Some(kind) => Some(kind),
        }
    }

    /// Test a node's property snapshot against this criteria.
    ///
    /// Every present attribute must equal the node's property; absent
    /// attributes are wildcards.
    #[must_use]
    pub fn matches(&self, props: &NodeProps) -> bool {
        if let Some(label) = &self.label {
            if props.label.as_deref() != Some(label.as_str()) {
                return false;
            }
        }
        if let Some(identity) = &self.identity {
            if props.identity.as_deref() != Some(identity.as_str()) {
                return false;
            }
        }
        if let Some(class_name) = &self.class_name {
            if props.class_name.as_deref() != Some(class_name.as_str()) {
                return false;
            }
        }
        if let Some(kind) = self.kind_or_unset() {
            if props.kind.as_ref() != Some(kind) {
                return false;
            }
        }
        true
    }

    /// Asymmetric wildcard comparison between two criteria.
    ///
    /// Only the *probe*'s present attributes are compared against this
    /// criteria's attributes, so `a.agrees_with(&b)` and `b.agrees_with(&a)`
    /// can disagree: a wildcard-heavy probe agrees with a fully-specified
    /// criteria but not necessarily the other way round. Callers pick the
    /// wildcard direction they need. Structural equality is the derived
    /// `PartialEq`.
    #[must_use]
    pub fn agrees_with(&self, probe: &Self) -> bool {
        if let Some(label) = &probe.label {
            if self.label.as_ref() != Some(label) {
                return false;
            }
        }
        if let Some(identity) = &probe.identity {
            if self.identity.as_ref() != Some(identity) {
                return false;
            }
        }
        if let Some(class_name) = &probe.class_name {
            if self.class_name.as_ref() != Some(class_name) {
                return false;
            }
        }
        if let Some(kind) = probe.kind_or_unset() {
            if self.kind_or_unset() != Some(kind) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(label) = &self.label {
            parts.push(format!("label={label}"));
        }
        if let Some(identity) = &self.identity {
            parts.push(format!("identity={identity}"));
        }
        if let Some(class_name) = &self.class_name {
            parts.push(format!("class={class_name}"));
        }
        if let Some(kind) = self.kind_or_unset() {
            parts.push(format!("kind={kind}"));
        }
        if parts.is_empty() {
            write!(f, "<any>")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// OR combination: true when any criteria in the slice matches the node.
///
/// An empty slice matches nothing; locator constructors reject it eagerly.
#[must_use]
pub fn matches_any(criteria: &[Criteria], props: &NodeProps) -> bool {
    criteria.iter().any(|c| c.matches(props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn submit_props() -> NodeProps {
        NodeProps {
            label: Some("Submit".into()),
            identity: Some("btn-submit".into()),
            class_name: Some("Button".into()),
            kind: Some(NodeKind::Button),
        }
    }

    mod matching_tests {
        use super::*;

        #[test]
        fn test_wildcard_matches_everything() {
            let any = Criteria::any();
            assert!(any.matches(&submit_props()));
            assert!(any.matches(&NodeProps::default()));
        }

        #[test]
        fn test_single_attribute_match() {
            assert!(Criteria::label("Submit").matches(&submit_props()));
            assert!(!Criteria::label("Cancel").matches(&submit_props()));
        }

        #[test]
        fn test_all_present_attributes_must_match() {
            let c = Criteria::label("Submit").with_class_name("Edit");
            assert!(!c.matches(&submit_props()));
        }

        #[test]
        fn test_unknown_kind_does_not_discriminate() {
            let c = Criteria::kind(NodeKind::Unknown);
            assert!(c.matches(&submit_props()));
            assert!(c.is_wildcard());
        }

        #[test]
        fn test_absent_node_property_fails_present_criteria() {
            let c = Criteria::label("Submit");
            assert!(!c.matches(&NodeProps::default()));
        }

        #[test]
        fn test_or_combination() {
            let criteria = [Criteria::label("Cancel"), Criteria::identity("btn-submit")];
            assert!(matches_any(&criteria, &submit_props()));
            let misses = [Criteria::label("Cancel"), Criteria::identity("btn-reset")];
            assert!(!matches_any(&misses, &submit_props()));
        }

        #[test]
        fn test_empty_criteria_slice_matches_nothing() {
            assert!(!matches_any(&[], &submit_props()));
        }
    }

    mod agrees_with_tests {
        use super::*;

        #[test]
        fn test_wildcard_probe_agrees_with_specified() {
            let full = Criteria::label("Submit").with_kind(NodeKind::Button);
            let probe = Criteria::label("Submit");
            assert!(full.agrees_with(&probe));
        }

        #[test]
        fn test_asymmetry_is_preserved() {
            let full = Criteria::label("Submit").with_kind(NodeKind::Button);
            let partial = Criteria::label("Submit");
            // partial's attributes are all satisfied by full
            assert!(full.agrees_with(&partial));
            // but full demands a kind that partial does not carry
            assert!(!partial.agrees_with(&full));
        }

        #[test]
        fn test_empty_probe_agrees_with_anything() {
            assert!(Criteria::label("x").agrees_with(&Criteria::any()));
            assert!(Criteria::any().agrees_with(&Criteria::any()));
        }

        #[test]
        fn test_structural_equality_stays_symmetric() {
            let a = Criteria::label("Submit");
            let b = Criteria::label("Submit").with_kind(NodeKind::Button);
            assert_ne!(a, b);
            assert_eq!(a, a.clone());
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display_lists_present_attributes() {
            let c = Criteria::label("Submit").with_class_name("Button");
            assert_eq!(c.to_string(), "label=Submit, class=Button");
        }

        #[test]
        fn test_display_wildcard() {
            assert_eq!(Criteria::any().to_string(), "<any>");
        }

        #[test]
        fn test_display_custom_kind() {
            let c = Criteria::kind(NodeKind::Custom("Hyperlink".into()));
            assert_eq!(c.to_string(), "kind=Hyperlink");
        }
    }

    proptest! {
        /// An all-absent criteria matches every node.
        #[test]
        fn prop_wildcard_matches_any_node(
            label in proptest::option::of(".{0,12}"),
            identity in proptest::option::of(".{0,12}"),
            class_name in proptest::option::of(".{0,12}"),
            has_kind in any::<bool>(),
        ) {
            let props = NodeProps {
                label,
                identity,
                class_name,
                kind: if has_kind { Some(NodeKind::Button) } else { None },
            };
            prop_assert!(Criteria::any().matches(&props));
        }

        /// OR semantics: a two-criteria set matches iff either member does.
        #[test]
        fn prop_or_semantics(
            node_label in "[a-c]",
            want_a in "[a-c]",
            want_b in "[a-c]",
        ) {
            let props = NodeProps {
                label: Some(node_label.clone()),
                ..NodeProps::default()
            };
            let a = Criteria::label(want_a.clone());
            let b = Criteria::label(want_b.clone());
            let expected = a.matches(&props) || b.matches(&props);
            prop_assert_eq!(matches_any(&[a, b], &props), expected);
        }
    }
}
