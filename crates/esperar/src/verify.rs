//! Logging verification helpers.
//!
//! Each helper reports its verdict through the optional [`Log`] sink
//! (`pass` on success) and returns an explicit result instead of
//! panicking, so a test runner decides what a failed check means. The
//! caller-supplied context string leads every failure message.

use std::fmt::Display;

use crate::log::{self, Log};
use crate::result::{EsperarError, EsperarResult};
use crate::wait::{self, Budget};

fn failed(message: String) -> EsperarError {
    EsperarError::Verification { message }
}

/// Expect two values to be equal
pub fn equal<T: PartialEq + Display>(
    expected: &T,
    actual: &T,
    context: &str,
    log: Option<&dyn Log>,
) -> EsperarResult<()> {
    if expected == actual {
        log::pass(
            log,
            &format!("verify equal passed. Expected and actual values are '{expected}'"),
        );
        Ok(())
    } else {
        Err(failed(format!(
            "{context}. Expected '{expected}'; actual '{actual}'"
        )))
    }
}

/// Expect two values to differ
pub fn not_equal<T: PartialEq + Display>(
    expected: &T,
    actual: &T,
    context: &str,
    log: Option<&dyn Log>,
) -> EsperarResult<()> {
    if expected == actual {
        Err(failed(format!(
            "{context}. Both values are '{actual}' but should differ"
        )))
    } else {
        log::pass(
            log,
            "verify not_equal passed. Expected and actual values are different",
        );
        Ok(())
    }
}

/// Expect `actual` to contain `substring`
pub fn contains(
    substring: &str,
    actual: &str,
    context: &str,
    log: Option<&dyn Log>,
) -> EsperarResult<()> {
    if actual.contains(substring) {
        log::pass(
            log,
            &format!("verify contains passed. Substring '{substring}' is present in '{actual}'"),
        );
        Ok(())
    } else {
        Err(failed(format!(
            "{context}. Not found '{substring}' in '{actual}'"
        )))
    }
}

/// Expect `actual` to start with `prefix`
pub fn starts_with(
    prefix: &str,
    actual: &str,
    context: &str,
    log: Option<&dyn Log>,
) -> EsperarResult<()> {
    if actual.starts_with(prefix) {
        log::pass(
            log,
            &format!("verify starts_with passed. String '{actual}' starts with '{prefix}'"),
        );
        Ok(())
    } else {
        Err(failed(format!(
            "{context}. String '{actual}' should start with '{prefix}'"
        )))
    }
}

/// Expect a condition to hold
pub fn is_true(condition: bool, context: &str, log: Option<&dyn Log>) -> EsperarResult<()> {
    if condition {
        log::pass(log, &format!("verify is_true passed ({context})"));
        Ok(())
    } else {
        Err(failed(format!(
            "{context}. Expected 'true'; actual 'false'"
        )))
    }
}

/// Expect a condition not to hold
pub fn is_false(condition: bool, context: &str, log: Option<&dyn Log>) -> EsperarResult<()> {
    if condition {
        Err(failed(format!(
            "{context}. Expected 'false'; actual 'true'"
        )))
    } else {
        log::pass(log, &format!("verify is_false passed ({context})"));
        Ok(())
    }
}

/// Expect two sequences to be equal, order included.
///
/// `{a,b,c}` and `{b,a,c}` are NOT equal; the failure message says whether
/// the lists differ in elements or only in order.
pub fn lists_equal<T: PartialEq + Display>(
    expected: &[T],
    actual: &[T],
    context: &str,
    log: Option<&dyn Log>,
) -> EsperarResult<()> {
    if expected == actual {
        log::pass(log, "verify lists_equal passed. Lists are equal");
        return Ok(());
    }

    let missing: Vec<String> = expected
        .iter()
        .filter(|item| !actual.contains(item))
        .map(ToString::to_string)
        .collect();
    let unexpected: Vec<String> = actual
        .iter()
        .filter(|item| !expected.contains(item))
        .map(ToString::to_string)
        .collect();

    let mut detail = String::new();
    if !missing.is_empty() {
        detail.push_str(&format!(
            ". Elements expected but not present: {}",
            missing.join(", ")
        ));
    }
    if !unexpected.is_empty() {
        detail.push_str(&format!(
            ". Elements present but not expected: {}",
            unexpected.join(", ")
        ));
    }
    if detail.is_empty() {
        detail = ". Same elements in a different order".to_string();
    }
    Err(failed(format!("{context}{detail}")))
}

/// Expect two sequences to differ as multisets
pub fn lists_not_equal<T: PartialEq + Display>(
    expected: &[T],
    actual: &[T],
    context: &str,
    log: Option<&dyn Log>,
) -> EsperarResult<()> {
    let mut remaining: Vec<&T> = expected.iter().collect();
    for item in actual {
        match remaining.iter().position(|candidate| *candidate == item) {
            Some(index) => {
                remaining.remove(index);
            }
            None => {
                log::pass(
                    log,
                    &format!("verify lists_not_equal passed. Item '{item}' is not expected"),
                );
                return Ok(());
            }
        }
    }
    if remaining.is_empty() {
        return Err(failed(format!(
            "{context}. Expected and actual lists are equal"
        )));
    }
    log::pass(
        log,
        &format!(
            "verify lists_not_equal passed. Item(s) '{}' missing from actual",
            remaining
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    );
    Ok(())
}

/// Poll a predicate under the wait engine, logging a pass once it holds.
///
/// # Errors
///
/// `ConditionTimeout` naming `description` and the budget.
pub fn eventually_true<F>(
    predicate: F,
    budget: Budget,
    description: &str,
    log: Option<&dyn Log>,
) -> EsperarResult<()>
where
    F: FnMut() -> bool,
{
    wait::until_true(predicate, budget, description)?;
    log::pass(log, &format!("verify eventually_true passed ({description})"));
    Ok(())
}
