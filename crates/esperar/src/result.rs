//! Result and error types for Esperar.

use crate::provider::ProviderFault;
use thiserror::Error;

/// Result type for Esperar operations
pub type EsperarResult<T> = Result<T, EsperarError>;

/// Errors that can occur while resolving locators or polling the tree
#[derive(Debug, Clone, Error)]
pub enum EsperarError {
    /// A single-result resolution matched zero nodes.
    ///
    /// Recoverable: `resolve_or_none` converts this into `None`, and the
    /// polling wrappers retry it until their budget runs out.
    #[error("can't find element '{locator}' under '{base}'")]
    NotFound {
        /// Human-readable description of the locator that failed
        locator: String,
        /// Description of the base node the search started from
        base: String,
    },

    /// A predicate poll exhausted its time budget
    #[error("wait for {description} timed out after {elapsed_ms}ms (budget {timeout_ms}ms)")]
    ConditionTimeout {
        /// Caller-supplied description of the awaited condition
        description: String,
        /// Configured budget in milliseconds
        timeout_ms: u64,
        /// Wall-clock time actually spent in milliseconds
        elapsed_ms: u64,
    },

    /// A retry-until-success poll exhausted its time budget.
    ///
    /// Carries the most recent underlying failure verbatim so the terminal
    /// cause is diagnosable without re-running.
    #[error(
        "retry timed out after {elapsed_ms}ms (budget {timeout_ms}ms, attempts {attempts}): {cause}"
    )]
    RetryTimeout {
        /// Configured budget in milliseconds
        timeout_ms: u64,
        /// Wall-clock time actually spent in milliseconds
        elapsed_ms: u64,
        /// Number of attempts made before giving up
        attempts: u32,
        /// Message of the last underlying failure
        cause: String,
    },

    /// A structurally invalid request (e.g. "find all ancestors").
    ///
    /// A programming error: fails fast and is never retried by the polling
    /// primitives.
    #[error("unsupported operation: {message}")]
    Unsupported {
        /// What was requested and why it is invalid
        message: String,
    },

    /// A failure raised by the tree provider during a search.
    ///
    /// Expected transient noise inside polling loops; only surfaced when it
    /// is the terminal cause at timeout.
    #[error("tree provider failure: {0}")]
    Provider(#[from] ProviderFault),

    /// A verification helper found a mismatch
    #[error("verification failed: {message}")]
    Verification {
        /// What was compared and how it differed
        message: String,
    },
}

impl EsperarError {
    /// Whether polling loops may absorb this error and try again.
    ///
    /// Structural errors bypass polling entirely; everything else is fair
    /// game for a retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}
