//! Chain-walking evaluation of locators against a tree provider.
//!
//! A [`Resolver`] borrows a [`TreeProvider`] plus an optional logger and
//! turns [`Locator`] chains into concrete nodes. Chains resolve strictly
//! left-to-right: the outermost ancestor link resolves against the provider
//! root, each later link against its parent's result. Every link is wrapped
//! in its own retry budget, so the worst-case latency of a chain is the sum
//! of per-link timeouts — callers size budgets for deep chains accordingly.

use crate::criteria::{matches_any, Criteria};
use crate::locator::{Locator, Scope};
use crate::log::{self, Log};
use crate::provider::{SearchScope, TreeProvider};
use crate::result::{EsperarError, EsperarResult};
use crate::wait::{self, Budget};

/// Default bound on upward steps for ancestor searches
pub const DEFAULT_ANCESTOR_DEPTH: usize = 20;

/// Evaluates locators against one provider.
///
/// Carries no resolution state; cheap to construct per call site.
pub struct Resolver<'a, P: TreeProvider> {
    provider: &'a P,
    log: Option<&'a dyn Log>,
    budget: Budget,
}

impl<'a, P: TreeProvider> Resolver<'a, P> {
    /// Resolver with no logger and the default per-link budget
    #[must_use]
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            log: None,
            budget: Budget::default(),
        }
    }

    /// Attach a logging sink
    #[must_use]
    pub fn with_log(mut self, log: &'a dyn Log) -> Self {
        self.log = Some(log);
        self
    }

    /// Override the per-link retry budget
    #[must_use]
    pub const fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// The provider this resolver reads from
    #[must_use]
    pub const fn provider(&self) -> &'a P {
        self.provider
    }

    /// The configured per-link budget
    #[must_use]
    pub const fn budget(&self) -> Budget {
        self.budget
    }

    /// The configured logger, if any
    #[must_use]
    pub const fn logger(&self) -> Option<&'a dyn Log> {
        self.log
    }

    /// Resolve the full chain, polling each link under the per-link budget.
    ///
    /// When multiple nodes match a link, the first match in provider-
    /// reported order wins; order is provider-defined and not stabilized
    /// here.
    ///
    /// # Errors
    ///
    /// `RetryTimeout` wrapping the last underlying `NotFound` or provider
    /// fault once a link's budget runs out.
    pub fn resolve(&self, locator: &Locator) -> EsperarResult<P::Node> {
        self.resolve_from(None, locator)
    }

    /// Resolve the full chain rooted at an explicit base node instead of
    /// the provider root, with the same per-link polling as [`resolve`].
    ///
    /// [`resolve`]: Self::resolve
    pub fn resolve_under(&self, base: &P::Node, locator: &Locator) -> EsperarResult<P::Node> {
        self.resolve_from(Some(base.clone()), locator)
    }

    fn resolve_from(&self, start: Option<P::Node>, locator: &Locator) -> EsperarResult<P::Node> {
        let links = locator.chain();
        let mut base = start;
        for link in links {
            let resolved = wait::until_ok(
                || {
                    let current = match &base {
                        Some(node) => node.clone(),
                        None => self.provider.root()?,
                    };
                    let result = self.resolve_within(&current, link);
                    if let Err(err @ EsperarError::Provider(_)) = &result {
                        // Expected transient noise mid-poll, never a hard
                        // failure on its own.
                        log::info(self.log, &format!("retrying link '{link}': {err}"));
                    }
                    result
                },
                self.budget,
            )
            .map_err(|err| {
                log::fail(self.log, &format!("giving up on link '{link}': {err}"));
                err
            })?;
            base = Some(resolved);
        }
        base.ok_or_else(|| EsperarError::Unsupported {
            message: "locator chain resolved no links".into(),
        })
    }

    /// Resolve the full chain in a single pass, with no polling.
    ///
    /// # Errors
    ///
    /// `NotFound` on the first link that matches nothing; provider faults
    /// propagate as `Provider`.
    pub fn resolve_now(&self, locator: &Locator) -> EsperarResult<P::Node> {
        let mut base = self.provider.root()?;
        for link in locator.chain() {
            base = self.resolve_within(&base, link)?;
        }
        Ok(base)
    }

    /// Single-pass probe: absence instead of failure.
    ///
    /// Transient provider failures are swallowed here too, treated as "not
    /// found yet" but logged at warn; plain absence is logged at info. This
    /// is the primitive behind existence checks and pre-polling probes.
    #[must_use]
    pub fn resolve_or_none(&self, locator: &Locator) -> Option<P::Node> {
        match self.resolve_now(locator) {
            Ok(node) => Some(node),
            Err(err @ EsperarError::Provider(_)) => {
                log::warn(
                    self.log,
                    &format!("probe '{}' hit a provider fault: {err}", locator.path()),
                );
                None
            }
            Err(err) => {
                log::info(
                    self.log,
                    &format!("probe '{}' came back empty: {err}", locator.path()),
                );
                None
            }
        }
    }

    /// Resolve every node matching the final link, polling under the
    /// per-link budget. An empty result is logged, not an error.
    ///
    /// # Errors
    ///
    /// `Unsupported` for ancestor-scope locators: ancestor search has at
    /// most one result per level and "find all ancestors" is not a
    /// supported query. Fails fast, before any polling.
    pub fn resolve_all(&self, locator: &Locator) -> EsperarResult<Vec<P::Node>> {
        self.resolve_all_from(None, locator)
    }

    /// As [`resolve_all`], rooted at an explicit base node.
    ///
    /// [`resolve_all`]: Self::resolve_all
    pub fn resolve_all_under(
        &self,
        base: &P::Node,
        locator: &Locator,
    ) -> EsperarResult<Vec<P::Node>> {
        self.resolve_all_from(Some(base.clone()), locator)
    }

    fn resolve_all_from(
        &self,
        start: Option<P::Node>,
        locator: &Locator,
    ) -> EsperarResult<Vec<P::Node>> {
        if locator.scope() == Scope::Ancestor {
            return Err(EsperarError::Unsupported {
                message: format!("find-all is not implemented for ancestor locator '{locator}'"),
            });
        }

        let base = match locator.parent() {
            Some(parent) => self.resolve_from(start, parent)?,
            None => match start {
                Some(node) => node,
                None => self.provider.root()?,
            },
        };
        let scope = downward_scope(locator.scope())?;
        let criteria = locator.criteria();

        let found = wait::until_ok(
            || {
                self.provider
                    .search(&base, scope, &|props| matches_any(criteria, props))
                    .map_err(EsperarError::from)
            },
            self.budget,
        )
        .map_err(|err| {
            log::fail(self.log, &format!("giving up on '{locator}': {err}"));
            err
        })?;
        if found.is_empty() {
            log::info(
                self.log,
                &format!(
                    "can't find any element '{locator}' under '{}'",
                    self.describe_node(&base)
                ),
            );
        } else {
            log::info(self.log, &format!("found {} elements", found.len()));
        }
        Ok(found)
    }

    /// Resolve one chain link against an explicit base node, single
    /// attempt. Element handles use this for searches rooted at themselves.
    ///
    /// # Errors
    ///
    /// `NotFound` on zero matches; provider faults propagate.
    pub fn resolve_within(&self, base: &P::Node, locator: &Locator) -> EsperarResult<P::Node> {
        let found = match locator.scope() {
            Scope::Ancestor => {
                self.ancestor_matching(base, locator.criteria(), DEFAULT_ANCESTOR_DEPTH)?
            }
            scope => {
                let criteria = locator.criteria();
                self.provider
                    .search(base, downward_scope(scope)?, &|props| {
                        matches_any(criteria, props)
                    })?
                    .into_iter()
                    .next()
            }
        };
        found.ok_or_else(|| EsperarError::NotFound {
            locator: locator.to_string(),
            base: self.describe_node(base),
        })
    }

    /// Walk upward from `node` through at most `max_depth` parent steps,
    /// returning the first ancestor matching the OR-combined criteria.
    ///
    /// Reaching the root (or the depth bound) without a match is absence,
    /// logged at info, never an error.
    pub fn ancestor_matching(
        &self,
        node: &P::Node,
        criteria: &[Criteria],
        max_depth: usize,
    ) -> EsperarResult<Option<P::Node>> {
        let mut current = self.provider.parent(node)?;
        for _ in 0..max_depth {
            let Some(candidate) = current else {
                break;
            };
            let props = self.provider.properties(&candidate)?;
            if matches_any(criteria, &props) {
                return Ok(Some(candidate));
            }
            current = self.provider.parent(&candidate)?;
        }
        log::info(
            self.log,
            &format!(
                "can't find matching ancestor for '{}' within {max_depth} levels",
                self.describe_node(node)
            ),
        );
        Ok(None)
    }

    fn describe_node(&self, node: &P::Node) -> String {
        self.provider
            .properties(node)
            .map(|props| props.describe())
            .unwrap_or_else(|_| "<unreadable>".to_string())
    }
}

impl<P: TreeProvider> std::fmt::Debug for Resolver<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

/// Ancestor scope has no downward search direction; refusing it here keeps
/// a misrouted ancestor link from turning into a wrong-direction search.
fn downward_scope(scope: Scope) -> EsperarResult<SearchScope> {
    match scope {
        Scope::Children => Ok(SearchScope::Children),
        Scope::Descendants => Ok(SearchScope::Descendants),
        Scope::Ancestor => Err(EsperarError::Unsupported {
            message: "ancestor scope cannot be searched downward".into(),
        }),
    }
}
