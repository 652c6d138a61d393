//! Collaborator contracts for the externally-owned UI tree.
//!
//! The engine never owns the hierarchy it searches; a desktop accessibility
//! tree or a browser DOM sits behind [`TreeProvider`]. Every provider call
//! may fail transiently (remote process busy, node recycled mid-walk), which
//! the polling layer treats as expected noise rather than a terminal error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::criteria::NodeKind;

/// A transient failure raised by the tree provider.
///
/// Carries only a message: the provider's own error type is opaque to this
/// layer, and the message is what ends up inside a timeout diagnostic when
/// the fault turns out to be the terminal cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderFault {
    /// Provider-reported failure message
    pub message: String,
}

impl ProviderFault {
    /// Create a new fault from a provider message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Read-only snapshot of one tree node's identifying properties.
///
/// Values may be stale the moment they are returned; re-reading through
/// [`TreeProvider::properties`] defines the node's current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProps {
    /// Accessible label / name, if the node reports one
    pub label: Option<String>,
    /// Stable automation identity, if the node reports one
    pub identity: Option<String>,
    /// Provider-native class name, if the node reports one
    pub class_name: Option<String>,
    /// Control kind as reported by the provider
    pub kind: Option<NodeKind>,
}

impl NodeProps {
    /// Short description used in log and failure messages
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.label, &self.identity) {
            (Some(label), _) => label.clone(),
            (None, Some(identity)) => identity.clone(),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}

/// Downward search region for a provider query.
///
/// Ancestor walks go through [`TreeProvider::parent`], never through
/// `search`, so the scope enum the provider sees is downward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchScope {
    /// Only direct children of the base node
    Children,
    /// The full subtree under the base node, provider-order traversal
    Descendants,
}

/// The externally-owned hierarchical tree being searched.
///
/// Implementations wrap a desktop accessibility API or a browser driver.
/// All methods are synchronous and blocking; all may raise transient
/// [`ProviderFault`]s at any time.
pub trait TreeProvider {
    /// Provider-native node reference. Cheap to clone; may go stale, which
    /// is detected lazily on the next read through this trait.
    type Node: Clone;

    /// The root of the tree
    fn root(&self) -> Result<Self::Node, ProviderFault>;

    /// Search the given scope under `base` for nodes whose properties
    /// satisfy `predicate`, in provider-reported order.
    ///
    /// Result order is provider-defined and not stabilized by this layer.
    fn search(
        &self,
        base: &Self::Node,
        scope: SearchScope,
        predicate: &dyn Fn(&NodeProps) -> bool,
    ) -> Result<Vec<Self::Node>, ProviderFault>;

    /// The immediate parent of `node`, or `None` at the root
    fn parent(&self, node: &Self::Node) -> Result<Option<Self::Node>, ProviderFault>;

    /// A fresh property snapshot for `node`.
    ///
    /// A stale node surfaces here as a fault.
    fn properties(&self, node: &Self::Node) -> Result<NodeProps, ProviderFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_fault_message() {
        let fault = ProviderFault::new("element not available");
        assert_eq!(fault.to_string(), "element not available");
    }

    #[test]
    fn test_node_props_describe_prefers_label() {
        let props = NodeProps {
            label: Some("Submit".into()),
            identity: Some("btn-submit".into()),
            ..NodeProps::default()
        };
        assert_eq!(props.describe(), "Submit");
    }

    #[test]
    fn test_node_props_describe_falls_back_to_identity() {
        let props = NodeProps {
            identity: Some("btn-submit".into()),
            ..NodeProps::default()
        };
        assert_eq!(props.describe(), "btn-submit");
    }

    #[test]
    fn test_node_props_describe_unnamed() {
        assert_eq!(NodeProps::default().describe(), "<unnamed>");
    }
}
