//! Logging capability for resolution and polling diagnostics.
//!
//! Every entry point takes an explicit `Option<&dyn Log>` instead of a
//! process-wide default; an absent logger is legal and silently disables
//! logging. Log calls are fire-and-forget and never affect control flow or
//! return values.

/// Pass/fail-aware logging sink consumed by the engine.
///
/// `info` carries expected transient noise (a provider fault mid-poll, a
/// probe that came back empty); `pass`/`fail` mark verification outcomes.
pub trait Log {
    /// Informational message; expected noise, never a terminal condition
    fn info(&self, message: &str);

    /// A verification or wait succeeded
    fn pass(&self, message: &str);

    /// Something suspicious but non-fatal
    fn warn(&self, message: &str);

    /// A hard failure about to be surfaced to the caller
    fn fail(&self, message: &str);
}

/// [`Log`] adapter that forwards to the `tracing` crate.
///
/// Pass messages are emitted at info level with a `verdict` field so a
/// subscriber can split them from plain progress output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl Log for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "esperar", "{message}");
    }

    fn pass(&self, message: &str) {
        tracing::info!(target: "esperar", verdict = "pass", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "esperar", "{message}");
    }

    fn fail(&self, message: &str) {
        tracing::error!(target: "esperar", verdict = "fail", "{message}");
    }
}

pub(crate) fn info(log: Option<&dyn Log>, message: &str) {
    if let Some(log) = log {
        log.info(message);
    }
}

pub(crate) fn pass(log: Option<&dyn Log>, message: &str) {
    if let Some(log) = log {
        log.pass(message);
    }
}

pub(crate) fn warn(log: Option<&dyn Log>, message: &str) {
    if let Some(log) = log {
        log.warn(message);
    }
}

pub(crate) fn fail(log: Option<&dyn Log>, message: &str) {
    if let Some(log) = log {
        log.fail(message);
    }
}

/// Test double that records every call in order
#[cfg(test)]
pub(crate) struct RecordingLog {
    pub(crate) entries: std::cell::RefCell<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingLog {
    pub(crate) fn new() -> Self {
        Self {
            entries: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn messages(&self, severity: &str) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(sev, _)| sev == severity)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn info(&self, message: &str) {
        self.entries
            .borrow_mut()
            .push(("info".into(), message.into()));
    }

    fn pass(&self, message: &str) {
        self.entries
            .borrow_mut()
            .push(("pass".into(), message.into()));
    }

    fn warn(&self, message: &str) {
        self.entries
            .borrow_mut()
            .push(("warn".into(), message.into()));
    }

    fn fail(&self, message: &str) {
        self.entries
            .borrow_mut()
            .push(("fail".into(), message.into()));
    }
}
