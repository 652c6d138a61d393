//! Esperar: Polling Resolution Engine for UI Element Trees
//!
//! Esperar (Spanish: "to wait/hope") locates elements in an external UI
//! tree that changes on its own schedule. Callers describe WHAT they are
//! looking for with wildcardable [`Criteria`] and chainable [`Locator`]s;
//! the engine handles WHEN, polling every lookup under a deadline so a
//! script never races the application it drives.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ESPERAR Architecture                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌──────────┐    ┌──────────┐    ┌──────────────┐           │
//! │   │ Locator  │    │ Resolver │    │ TreeProvider │           │
//! │   │ chain    │───►│ + wait   │───►│ (UI backend) │           │
//! │   │          │    │ engine   │    │              │           │
//! │   └──────────┘    └──────────┘    └──────────────┘           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`TreeProvider`] trait is the only coupling to a concrete UI
//! backend; [`mock::MockTree`] implements it in memory for tests.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod criteria;
mod element;
mod locator;
mod log;
mod provider;
mod resolver;
mod result;

/// In-memory [`TreeProvider`] for tests and downstream binding crates
pub mod mock;

/// Logging verification helpers returning results instead of panicking
pub mod verify;

/// Deadline-bounded polling primitives
pub mod wait;

pub use criteria::{matches_any, Criteria, NodeKind};
pub use element::Element;
pub use locator::{Locator, Scope};
pub use log::{Log, TracingLog};
pub use provider::{NodeProps, ProviderFault, SearchScope, TreeProvider};
pub use resolver::{Resolver, DEFAULT_ANCESTOR_DEPTH};
pub use result::{EsperarError, EsperarResult};
pub use wait::{Budget, PollStrategy};
