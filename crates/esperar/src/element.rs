//! Resolved node handles with derived queries.
//!
//! An [`Element`] is a thin façade over the resolver and the polling
//! primitives: a provider-native node reference plus the locator that
//! produced it (kept for diagnostics). Handles are never mutated; if the
//! provider later reports the node stale, that is detected lazily on the
//! next property read, not eagerly.

use std::fmt;

use crate::criteria::Criteria;
use crate::locator::Locator;
use crate::log::Log;
use crate::provider::{NodeProps, TreeProvider};
use crate::resolver::{Resolver, DEFAULT_ANCESTOR_DEPTH};
use crate::result::EsperarResult;
use crate::wait::{self, Budget};

/// A resolved, read-only reference to one tree node.
pub struct Element<'a, P: TreeProvider> {
    provider: &'a P,
    log: Option<&'a dyn Log>,
    node: P::Node,
    locator: Option<Locator>,
}

impl<'a, P: TreeProvider> Element<'a, P> {
    /// Wrap an already-known node with no originating locator.
    ///
    /// Existence checks on such a handle fall back to reading the node's
    /// properties, since there is nothing to re-resolve.
    #[must_use]
    pub fn new(provider: &'a P, node: P::Node) -> Self {
        Self {
            provider,
            log: None,
            node,
            locator: None,
        }
    }

    /// Resolve `locator` and wrap the result, keeping the locator for
    /// diagnostics and re-probing.
    ///
    /// # Errors
    ///
    /// Whatever [`Resolver::resolve`] surfaces at timeout.
    pub fn resolve(resolver: &Resolver<'a, P>, locator: Locator) -> EsperarResult<Self> {
        let node = resolver.resolve(&locator)?;
        Ok(Self {
            provider: resolver.provider(),
            log: resolver.logger(),
            node,
            locator: Some(locator),
        })
    }

    /// Attach a logging sink
    #[must_use]
    pub fn with_log(mut self, log: &'a dyn Log) -> Self {
        self.log = Some(log);
        self
    }

    /// The provider-native node reference
    #[must_use]
    pub const fn node(&self) -> &P::Node {
        &self.node
    }

    /// The locator that produced this handle, if any
    #[must_use]
    pub fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    fn resolver(&self) -> Resolver<'a, P> {
        let resolver = Resolver::new(self.provider);
        match self.log {
            Some(log) => resolver.with_log(log),
            None => resolver,
        }
    }

    /// Single existence probe, no polling.
    ///
    /// With an originating locator this re-resolves from the root; without
    /// one it degrades to "does the node still read back", so a stale
    /// handle reports absent.
    #[must_use]
    pub fn exists(&self) -> bool {
        match &self.locator {
            Some(locator) => self.resolver().resolve_or_none(locator).is_some(),
            None => self.provider.properties(&self.node).is_ok(),
        }
    }

    /// Poll until the element exists.
    ///
    /// # Errors
    ///
    /// `ConditionTimeout` naming the locator and the configured budget.
    pub fn wait_until_present(&self, budget: Budget) -> EsperarResult<()> {
        wait::until_true(
            || self.exists(),
            budget,
            &format!("element '{}' to appear", self.describe()),
        )
    }

    /// Poll until the element no longer exists.
    ///
    /// # Errors
    ///
    /// `ConditionTimeout` naming the locator and the configured budget.
    pub fn wait_until_gone(&self, budget: Budget) -> EsperarResult<()> {
        wait::until_true(
            || !self.exists(),
            budget,
            &format!("element '{}' to disappear", self.describe()),
        )
    }

    /// Find a single element below this one, polling under `budget`.
    ///
    /// When this element has an originating locator the returned handle
    /// keeps the full root-anchored chain (this element's chain plus the
    /// relative link), so its existence probes re-resolve from the root
    /// like any other locator-backed handle. A child found below a raw
    /// handle has no root-resolvable chain and falls back to staleness
    /// reads, as [`Element::new`] handles do.
    ///
    /// # Errors
    ///
    /// `RetryTimeout` wrapping the last `NotFound` once the budget runs
    /// out.
    pub fn find(&self, locator: Locator, budget: Budget) -> EsperarResult<Self> {
        let resolver = self.resolver().with_budget(budget);
        let node = resolver.resolve_under(&self.node, &locator)?;
        // The relative chain only resolves from the root when anchored
        // under this element's own chain.
        let locator = self.locator.clone().map(|base| locator.under(base));
        Ok(Self {
            provider: self.provider,
            log: self.log,
            node,
            locator,
        })
    }

    /// Find every matching element below this one.
    ///
    /// # Errors
    ///
    /// `Unsupported` for ancestor-scope locators; provider faults at
    /// timeout.
    pub fn find_all(&self, locator: &Locator, budget: Budget) -> EsperarResult<Vec<Self>> {
        let resolver = self.resolver().with_budget(budget);
        let nodes = resolver.resolve_all_under(&self.node, locator)?;
        Ok(nodes
            .into_iter()
            .map(|node| Self {
                provider: self.provider,
                log: self.log,
                node,
                locator: None,
            })
            .collect())
    }

    /// Nearest ancestor matching the OR-combined criteria, walking at most
    /// [`DEFAULT_ANCESTOR_DEPTH`] steps. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Provider faults during the upward walk.
    pub fn ancestor(&self, criteria: &[Criteria]) -> EsperarResult<Option<Self>> {
        self.ancestor_within(criteria, DEFAULT_ANCESTOR_DEPTH)
    }

    /// As [`ancestor`], with an explicit depth bound.
    ///
    /// [`ancestor`]: Self::ancestor
    pub fn ancestor_within(
        &self,
        criteria: &[Criteria],
        max_depth: usize,
    ) -> EsperarResult<Option<Self>> {
        let found = self
            .resolver()
            .ancestor_matching(&self.node, criteria, max_depth)?;
        Ok(found.map(|node| Self {
            provider: self.provider,
            log: self.log,
            node,
            locator: None,
        }))
    }

    /// Fresh property snapshot; re-reading defines the node's current
    /// state. A stale node surfaces here as a provider failure.
    ///
    /// # Errors
    ///
    /// `Provider` when the node can no longer be read.
    pub fn properties(&self) -> EsperarResult<NodeProps> {
        Ok(self.provider.properties(&self.node)?)
    }

    /// The node's current accessible label, if any
    ///
    /// # Errors
    ///
    /// `Provider` when the node can no longer be read.
    pub fn label(&self) -> EsperarResult<Option<String>> {
        Ok(self.properties()?.label)
    }

    /// Diagnostic description: the originating locator's chain when known,
    /// otherwise the node's current name
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.locator {
            Some(locator) => locator.path(),
            None => self
                .provider
                .properties(&self.node)
                .map(|props| props.describe())
                .unwrap_or_else(|_| "<unreadable>".to_string()),
        }
    }
}

impl<P: TreeProvider> fmt::Debug for Element<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("locator", &self.locator.as_ref().map(Locator::path))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::NodeKind;
    use crate::mock::{labeled, MockTree, NodeId};
    use crate::result::EsperarError;
    use std::time::Duration;

    fn dialog_tree() -> (MockTree, NodeId, NodeId) {
        let tree = MockTree::new();
        let window = tree.add_child(
            tree.root_id(),
            NodeProps {
                label: Some("Settings".into()),
                kind: Some(NodeKind::Window),
                ..NodeProps::default()
            },
        );
        let button = tree.add_child(window, labeled("Apply"));
        (tree, window, button)
    }

    fn short() -> Budget {
        Budget::new(Duration::from_millis(50))
    }

    mod existence_tests {
        use super::*;

        #[test]
        fn test_exists_via_locator_reprobe() {
            let (tree, ..) = dialog_tree();
            let resolver = Resolver::new(&tree);
            let element =
                Element::resolve(&resolver, Locator::descendant(Criteria::label("Apply")))
                    .unwrap();
            assert!(element.exists());
        }

        #[test]
        fn test_exists_false_after_removal() {
            let (tree, _, button) = dialog_tree();
            let resolver = Resolver::new(&tree);
            let element =
                Element::resolve(&resolver, Locator::descendant(Criteria::label("Apply")))
                    .unwrap();
            tree.remove(button);
            assert!(!element.exists());
        }

        #[test]
        fn test_raw_handle_existence_degrades_to_staleness() {
            let (tree, _, button) = dialog_tree();
            let element = Element::new(&tree, button);
            assert!(element.exists());
            tree.remove(button);
            assert!(!element.exists());
        }

        #[test]
        fn test_wait_until_present_immediate() {
            let (tree, ..) = dialog_tree();
            let resolver = Resolver::new(&tree);
            let element =
                Element::resolve(&resolver, Locator::descendant(Criteria::label("Apply")))
                    .unwrap();
            assert!(element.wait_until_present(short()).is_ok());
        }

        #[test]
        fn test_wait_until_present_timeout_names_locator() {
            let (tree, ..) = dialog_tree();
            let element = Element {
                provider: &tree,
                log: None,
                node: tree.root_id(),
                locator: Some(Locator::descendant(Criteria::label("Missing"))),
            };
            match element.wait_until_present(short()) {
                Err(EsperarError::ConditionTimeout {
                    description,
                    timeout_ms,
                    ..
                }) => {
                    assert!(description.contains("label=Missing"));
                    assert!(description.contains("to appear"));
                    assert_eq!(timeout_ms, 50);
                }
                other => panic!("expected ConditionTimeout, got {other:?}"),
            }
        }

        #[test]
        fn test_wait_until_gone_after_removal() {
            let (tree, _, button) = dialog_tree();
            let resolver = Resolver::new(&tree);
            let element =
                Element::resolve(&resolver, Locator::descendant(Criteria::label("Apply")))
                    .unwrap();
            tree.remove(button);
            assert!(element.wait_until_gone(short()).is_ok());
        }

        #[test]
        fn test_wait_until_gone_times_out_while_present() {
            let (tree, ..) = dialog_tree();
            let resolver = Resolver::new(&tree);
            let element =
                Element::resolve(&resolver, Locator::descendant(Criteria::label("Apply")))
                    .unwrap();
            let result = element.wait_until_gone(short());
            assert!(matches!(
                result,
                Err(EsperarError::ConditionTimeout { .. })
            ));
        }
    }

    mod find_tests {
        use super::*;

        #[test]
        fn test_find_below_element() {
            let (tree, window, button) = dialog_tree();
            let handle = Element::new(&tree, window);
            let found = handle
                .find(Locator::child(Criteria::label("Apply")), short())
                .unwrap();
            assert_eq!(*found.node(), button);
        }

        #[test]
        fn test_find_chain_below_element() {
            let (tree, window, button) = dialog_tree();
            let root = Element::new(&tree, tree.root_id());
            let chain = Locator::child(Criteria::label("Apply"))
                .under(Locator::child(Criteria::kind(NodeKind::Window)));
            let found = root.find(chain, short()).unwrap();
            assert_eq!(*found.node(), button);
            let _ = window;
        }

        #[test]
        fn test_find_timeout_wraps_not_found() {
            let (tree, window, _) = dialog_tree();
            let handle = Element::new(&tree, window);
            match handle.find(Locator::child(Criteria::label("Missing")), short()) {
                Err(EsperarError::RetryTimeout { cause, .. }) => {
                    assert!(cause.contains("can't find element"));
                }
                other => panic!("expected RetryTimeout, got {other:?}"),
            }
        }

        #[test]
        fn test_find_recovers_from_late_appearance() {
            let (tree, window, button) = dialog_tree();
            tree.conceal_until(button, 2);
            let handle = Element::new(&tree, window);
            let found = handle
                .find(
                    Locator::child(Criteria::label("Apply")),
                    Budget::new(Duration::from_secs(1)),
                )
                .unwrap();
            assert_eq!(*found.node(), button);
        }

        #[test]
        fn test_found_child_without_base_locator_reads_back_alive() {
            let (tree, window, button) = dialog_tree();
            let handle = Element::new(&tree, window);
            let found = handle
                .find(Locator::child(Criteria::label("Apply")), short())
                .unwrap();
            // No root-resolvable chain, so existence degrades to the
            // staleness read and must still see the live node.
            assert!(found.locator().is_none());
            assert!(found.exists());
            assert!(matches!(
                found.wait_until_gone(short()),
                Err(EsperarError::ConditionTimeout { .. })
            ));
            tree.remove(button);
            assert!(!found.exists());
        }

        #[test]
        fn test_found_child_keeps_root_anchored_chain() {
            let (tree, _, button) = dialog_tree();
            let resolver = Resolver::new(&tree);
            let window =
                Element::resolve(&resolver, Locator::descendant(Criteria::label("Settings")))
                    .unwrap();
            let found = window
                .find(Locator::child(Criteria::label("Apply")), short())
                .unwrap();
            assert_eq!(*found.node(), button);
            assert_eq!(
                found.describe(),
                "[descendants: label=Settings] -> [children: label=Apply]"
            );
            assert!(found.exists());
            assert!(found.wait_until_present(short()).is_ok());
            tree.remove(button);
            assert!(!found.exists());
            assert!(found.wait_until_gone(short()).is_ok());
        }

        #[test]
        fn test_find_all_below_element() {
            let (tree, window, _) = dialog_tree();
            tree.add_child(window, labeled("Apply"));
            let handle = Element::new(&tree, window);
            let found = handle
                .find_all(&Locator::child(Criteria::label("Apply")), short())
                .unwrap();
            assert_eq!(found.len(), 2);
        }
    }

    mod ancestor_tests {
        use super::*;

        #[test]
        fn test_ancestor_by_kind() {
            let (tree, window, button) = dialog_tree();
            let handle = Element::new(&tree, button);
            let found = handle
                .ancestor(&[Criteria::kind(NodeKind::Window)])
                .unwrap();
            assert_eq!(*found.unwrap().node(), window);
        }

        #[test]
        fn test_ancestor_depth_bound() {
            let (tree, _, button) = dialog_tree();
            let handle = Element::new(&tree, button);
            let found = handle
                .ancestor_within(&[Criteria::identity("root")], 1)
                .unwrap();
            assert!(found.is_none());
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_label_reads_current_state() {
            let (tree, _, button) = dialog_tree();
            let handle = Element::new(&tree, button);
            assert_eq!(handle.label().unwrap().as_deref(), Some("Apply"));
            tree.set_props(button, labeled("Retry"));
            assert_eq!(handle.label().unwrap().as_deref(), Some("Retry"));
        }

        #[test]
        fn test_stale_handle_read_is_provider_error() {
            let (tree, _, button) = dialog_tree();
            let handle = Element::new(&tree, button);
            tree.remove(button);
            assert!(matches!(
                handle.properties(),
                Err(EsperarError::Provider(_))
            ));
        }

        #[test]
        fn test_describe_prefers_locator_path() {
            let (tree, ..) = dialog_tree();
            let resolver = Resolver::new(&tree);
            let element =
                Element::resolve(&resolver, Locator::descendant(Criteria::label("Apply")))
                    .unwrap();
            assert_eq!(element.describe(), "[descendants: label=Apply]");
        }
    }
}
