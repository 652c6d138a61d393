//! Chainable, scoped search specifications.
//!
//! A [`Locator`] names *where* an element lives in the externally-owned
//! tree: a non-empty OR-set of [`Criteria`], a search [`Scope`], and an
//! optional parent locator forming a chain that is resolved outermost
//! ancestor first. Locators are immutable value objects; they carry no
//! resolution state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::criteria::Criteria;
use crate::result::{EsperarError, EsperarResult};

/// Search direction/region for one locator link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Only direct children of the base node are tested
    Children,
    /// The full subtree under the base node, provider-order traversal
    Descendants,
    /// Upward walk from the base node through its ancestors
    Ancestor,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Children => write!(f, "children"),
            Self::Descendants => write!(f, "descendants"),
            Self::Ancestor => write!(f, "ancestor"),
        }
    }
}

/// A search specification over criteria, with an optional parent chain.
///
/// Chains are acyclic by construction (`Box` ownership cannot loop) and
/// every constructor validates its criteria eagerly, so a locator that
/// exists is a locator the resolver can walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    criteria: Vec<Criteria>,
    scope: Scope,
    parent: Option<Box<Locator>>,
}

impl Locator {
    /// Locator with a single criteria
    #[must_use]
    pub fn new(scope: Scope, criteria: Criteria) -> Self {
        Self {
            criteria: vec![criteria],
            scope,
            parent: None,
        }
    }

    /// Locator matching any of several criteria (OR semantics).
    ///
    /// # Errors
    ///
    /// `Unsupported` if `criteria` is empty; an empty OR-set would match
    /// nothing and is always a construction bug.
    pub fn any_of(scope: Scope, criteria: Vec<Criteria>) -> EsperarResult<Self> {
        if criteria.is_empty() {
            return Err(EsperarError::Unsupported {
                message: "locator built with no criteria".into(),
            });
        }
        Ok(Self {
            criteria,
            scope,
            parent: None,
        })
    }

    /// Child-scope locator
    #[must_use]
    pub fn child(criteria: Criteria) -> Self {
        Self::new(Scope::Children, criteria)
    }

    /// Descendant-scope locator
    #[must_use]
    pub fn descendant(criteria: Criteria) -> Self {
        Self::new(Scope::Descendants, criteria)
    }

    /// Ancestor-scope locator
    #[must_use]
    pub fn ancestor(criteria: Criteria) -> Self {
        Self::new(Scope::Ancestor, criteria)
    }

    /// Attach a parent link, returning the extended chain.
    ///
    /// The parent resolves first; this locator then resolves against the
    /// parent's result.
    #[must_use]
    pub fn under(mut self, parent: Self) -> Self {
        // New parent goes at the head of any existing chain.
        match self.parent.take() {
            None => self.parent = Some(Box::new(parent)),
            Some(existing) => self.parent = Some(Box::new(existing.under(parent))),
        }
        self
    }

    /// Link locators left-to-right into one chain: the first entry is the
    /// outermost ancestor, the last is the target returned to the caller.
    ///
    /// # Errors
    ///
    /// `Unsupported` if `links` is empty.
    pub fn chained(links: Vec<Self>) -> EsperarResult<Self> {
        let mut iter = links.into_iter();
        let Some(head) = iter.next() else {
            return Err(EsperarError::Unsupported {
                message: "locator chain built with no links".into(),
            });
        };
        Ok(iter.fold(head, |chain, link| link.under(chain)))
    }

    /// The OR-combined criteria for this link
    #[must_use]
    pub fn criteria(&self) -> &[Criteria] {
        &self.criteria
    }

    /// The search scope for this link
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// The parent link, if this locator is part of a chain
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Chain links in resolution order: outermost ancestor first, this
    /// locator last.
    #[must_use]
    pub fn chain(&self) -> Vec<&Self> {
        let mut links = Vec::new();
        let mut current = Some(self);
        while let Some(link) = current {
            links.push(link);
            current = link.parent();
        }
        links.reverse();
        links
    }

    /// Full chain description used in failure messages
    #[must_use]
    pub fn path(&self) -> String {
        self.chain()
            .iter()
            .map(|link| format!("[{link}]"))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl fmt::Display for Locator {
    /// This link's criteria only; use [`Locator::path`] for the whole chain
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let described = self
            .criteria
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        write!(f, "{}: {described}", self.scope)
    }
}
