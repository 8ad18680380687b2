//! Gating predicates and the logical operator that combines them.
//!
//! A [`Condition`] is either payload-agnostic or payload-aware. A chain is a
//! slice of `Option<Condition<T>>`: `None` entries model unset slots in a
//! pre-loaded configuration and are skipped.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AtomResult;

type AgnosticFn = dyn Fn() -> AtomResult<bool> + Send + Sync;
type AwareFn<T> = dyn Fn(&T) -> AtomResult<bool> + Send + Sync;

/// Logical operator applied across a condition chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Every condition must pass. Stops at the first failing condition.
    #[default]
    And,
    /// One passing condition is enough. Stops at the first passing one.
    Or,
}

/// A single predicate in a condition chain.
pub enum Condition<T> {
    /// Ignores the raised item.
    Agnostic(Arc<AgnosticFn>),
    /// Receives the raised item.
    Aware(Arc<AwareFn<T>>),
}

impl<T> Condition<T> {
    /// Builds a payload-agnostic condition.
    pub fn agnostic<F>(f: F) -> Self
    where
        F: Fn() -> AtomResult<bool> + Send + Sync + 'static,
    {
        Self::Agnostic(Arc::new(f))
    }

    /// Builds a payload-aware condition.
    pub fn aware<F>(f: F) -> Self
    where
        F: Fn(&T) -> AtomResult<bool> + Send + Sync + 'static,
    {
        Self::Aware(Arc::new(f))
    }

    /// Evaluates the condition, passing `item` only to the aware form.
    ///
    /// # Errors
    ///
    /// Returns the predicate's own error unchanged.
    pub fn evaluate(&self, item: &T) -> AtomResult<bool> {
        match self {
            Self::Aware(f) => f(item),
            Self::Agnostic(f) => f(),
        }
    }

    /// Returns `true` for the payload-aware form.
    #[must_use]
    pub const fn is_payload_aware(&self) -> bool {
        matches!(self, Self::Aware(_))
    }
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Agnostic(f) => Self::Agnostic(Arc::clone(f)),
            Self::Aware(f) => Self::Aware(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agnostic(_) => f.write_str("Condition::Agnostic"),
            Self::Aware(_) => f.write_str("Condition::Aware"),
        }
    }
}

/// Runs a condition chain under `operator` and decides whether to respond.
///
/// The result starts as `operator == And`, so an empty `And` chain always
/// passes and an empty `Or` chain never does. Existing configurations rely
/// on that asymmetry; keep it.
///
/// - `And`: the first `false` returns immediately; later entries are not
///   evaluated.
/// - `Or`: the first `true` returns immediately; later entries are not
///   evaluated.
///
/// # Errors
///
/// Returns the first predicate error. Later entries are not evaluated.
pub fn evaluate_chain<T>(
    operator: ConditionOperator,
    conditions: &[Option<Condition<T>>],
    item: &T,
) -> AtomResult<bool> {
    let mut should_respond = operator == ConditionOperator::And;

    for condition in conditions.iter().flatten() {
        should_respond = condition.evaluate(item)?;

        match operator {
            ConditionOperator::And if !should_respond => {
                tracing::trace!("condition chain short-circuited on false");
                return Ok(false);
            }
            ConditionOperator::Or if should_respond => break,
            _ => {}
        }
    }

    Ok(should_respond)
}
