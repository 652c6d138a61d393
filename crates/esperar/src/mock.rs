//! In-memory mock tree provider.
//!
//! Downstream binding crates (and this crate's own tests) need to exercise
//! resolution and polling without a live accessibility tree or browser
//! session. [`MockTree`] is an arena-backed [`TreeProvider`] with three
//! testing hooks: scripted transient faults, delayed node visibility for
//! polling-recovery scenarios, and a search-call recorder for asserting
//! chain resolution order.
//!
//! Single-threaded by design, matching the engine's concurrency model.

use std::cell::{Cell, RefCell};

use crate::provider::{NodeProps, ProviderFault, SearchScope, TreeProvider};

/// Arena index identifying one mock node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Convenience snapshot with only a label set
#[must_use]
pub fn labeled(label: impl Into<String>) -> NodeProps {
    NodeProps {
        label: Some(label.into()),
        ..NodeProps::default()
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    props: NodeProps,
    parent: Option<usize>,
    children: Vec<usize>,
    alive: bool,
    /// Node is excluded from search results until this many searches have
    /// been served; lets a single-threaded test script "appears later"
    reveal_at: u32,
}

/// Scripted in-memory tree implementing [`TreeProvider`].
#[derive(Debug, Default)]
pub struct MockTree {
    nodes: RefCell<Vec<NodeData>>,
    faults_remaining: Cell<u32>,
    searches_served: Cell<u32>,
    search_log: RefCell<Vec<(NodeId, SearchScope)>>,
}

impl MockTree {
    /// Tree containing only a root node with identity `root`
    #[must_use]
    pub fn new() -> Self {
        let tree = Self::default();
        tree.nodes.borrow_mut().push(NodeData {
            props: NodeProps {
                identity: Some("root".into()),
                ..NodeProps::default()
            },
            parent: None,
            children: Vec::new(),
            alive: true,
            reveal_at: 0,
        });
        tree
    }

    /// The root node's id
    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child node under `parent`, returning its id
    pub fn add_child(&self, parent: NodeId, props: NodeProps) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = nodes.len();
        nodes.push(NodeData {
            props,
            parent: Some(parent.0),
            children: Vec::new(),
            alive: true,
            reveal_at: 0,
        });
        nodes[parent.0].children.push(id);
        NodeId(id)
    }

    /// Mark a node (and nothing else) dead: it disappears from searches and
    /// any retained handle to it reads back stale
    pub fn remove(&self, node: NodeId) {
        self.nodes.borrow_mut()[node.0].alive = false;
    }

    /// Replace a node's property snapshot; retained handles see the new
    /// values on their next read
    pub fn set_props(&self, node: NodeId, props: NodeProps) {
        self.nodes.borrow_mut()[node.0].props = props;
    }

    /// Script the next `count` search/properties calls to raise a
    /// transient fault
    pub fn fail_next(&self, count: u32) {
        self.faults_remaining.set(count);
    }

    /// Hide `node` from search results until the tree has served the given
    /// number of searches
    pub fn conceal_until(&self, node: NodeId, searches: u32) {
        self.nodes.borrow_mut()[node.0].reveal_at = searches;
    }

    /// Recorded `(base, scope)` pairs, in search order
    #[must_use]
    pub fn search_log(&self) -> Vec<(NodeId, SearchScope)> {
        self.search_log.borrow().clone()
    }

    /// Forget recorded searches
    pub fn clear_search_log(&self) {
        self.search_log.borrow_mut().clear();
    }

    fn consume_fault(&self) -> Result<(), ProviderFault> {
        let remaining = self.faults_remaining.get();
        if remaining > 0 {
            self.faults_remaining.set(remaining - 1);
            return Err(ProviderFault::new("injected transient fault"));
        }
        Ok(())
    }

    fn visible(&self, data: &NodeData) -> bool {
        data.alive && self.searches_served.get() >= data.reveal_at
    }

    fn collect_descendants(&self, base: usize, out: &mut Vec<usize>) {
        let nodes = self.nodes.borrow();
        // Preorder DFS over the arena, matching a provider's typical
        // depth-first reporting order.
        let mut stack: Vec<usize> = nodes[base].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in nodes[id].children.iter().rev() {
                stack.push(*child);
            }
        }
    }
}

impl TreeProvider for MockTree {
    type Node = NodeId;

    fn root(&self) -> Result<NodeId, ProviderFault> {
        Ok(self.root_id())
    }

    fn search(
        &self,
        base: &NodeId,
        scope: SearchScope,
        predicate: &dyn Fn(&NodeProps) -> bool,
    ) -> Result<Vec<NodeId>, ProviderFault> {
        self.search_log.borrow_mut().push((*base, scope));
        self.searches_served.set(self.searches_served.get() + 1);
        self.consume_fault()?;

        let mut candidates = Vec::new();
        match scope {
            SearchScope::Children => {
                candidates.extend(self.nodes.borrow()[base.0].children.iter().copied());
            }
            SearchScope::Descendants => self.collect_descendants(base.0, &mut candidates),
        }

        let nodes = self.nodes.borrow();
        Ok(candidates
            .into_iter()
            .filter(|id| self.visible(&nodes[*id]) && predicate(&nodes[*id].props))
            .map(NodeId)
            .collect())
    }

    fn parent(&self, node: &NodeId) -> Result<Option<NodeId>, ProviderFault> {
        Ok(self.nodes.borrow()[node.0].parent.map(NodeId))
    }

    fn properties(&self, node: &NodeId) -> Result<NodeProps, ProviderFault> {
        self.consume_fault()?;
        let nodes = self.nodes.borrow();
        let data = &nodes[node.0];
        if !data.alive {
            return Err(ProviderFault::new("node is stale"));
        }
        Ok(data.props.clone())
    }
}
