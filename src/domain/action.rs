//! Side-effecting responses executed after a condition chain passes.

use std::fmt;
use std::sync::Arc;

use crate::error::AtomResult;

type AgnosticFn = dyn Fn() -> AtomResult + Send + Sync;
type AwareFn<T> = dyn Fn(&T) -> AtomResult + Send + Sync;

/// A single entry in an action chain.
pub enum Action<T> {
    /// Ignores the raised item.
    Agnostic(Arc<AgnosticFn>),
    /// Receives the raised item.
    Aware(Arc<AwareFn<T>>),
}

impl<T> Action<T> {
    /// Builds a payload-agnostic action.
    pub fn agnostic<F>(f: F) -> Self
    where
        F: Fn() -> AtomResult + Send + Sync + 'static,
    {
        Self::Agnostic(Arc::new(f))
    }

    /// Builds a payload-aware action.
    pub fn aware<F>(f: F) -> Self
    where
        F: Fn(&T) -> AtomResult + Send + Sync + 'static,
    {
        Self::Aware(Arc::new(f))
    }

    /// Runs the action, passing `item` only to the aware form.
    ///
    /// # Errors
    ///
    /// Returns the action's own error unchanged.
    pub fn execute(&self, item: &T) -> AtomResult {
        match self {
            Self::Aware(f) => f(item),
            Self::Agnostic(f) => f(),
        }
    }
}

impl<T: fmt::Debug + 'static> Action<T> {
    /// Action that logs every item at `debug` level.
    #[must_use]
    pub fn debug_log() -> Self {
        Self::aware(|item: &T| {
            tracing::debug!(?item, "event raised");
            Ok(())
        })
    }
}

impl<T> Clone for Action<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Agnostic(f) => Self::Agnostic(Arc::clone(f)),
            Self::Aware(f) => Self::Aware(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agnostic(_) => f.write_str("Action::Agnostic"),
            Self::Aware(_) => f.write_str("Action::Aware"),
        }
    }
}

/// Runs every present action in configuration order.
///
/// # Errors
///
/// Returns the first action error; later actions do not run.
pub fn execute_chain<T>(actions: &[Option<Action<T>>], item: &T) -> AtomResult {
    for action in actions.iter().flatten() {
        action.execute(item)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn actions_run_in_order_and_skip_absent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Arc::clone(&log);
        let b = Arc::clone(&log);
        let chain: Vec<Option<Action<u8>>> = vec![
            Some(Action::aware(move |x: &u8| {
                a.lock().push(format!("aware:{x}"));
                Ok(())
            })),
            None,
            Some(Action::agnostic(move || {
                b.lock().push("agnostic".to_string());
                Ok(())
            })),
        ];

        assert!(execute_chain(&chain, &9).is_ok());
        assert_eq!(*log.lock(), vec!["aware:9".to_string(), "agnostic".to_string()]);
    }

    #[test]
    fn failing_action_stops_chain() {
        let ran = Arc::new(Mutex::new(false));
        let ran_in = Arc::clone(&ran);
        let chain: Vec<Option<Action<u8>>> = vec![
            Some(Action::agnostic(|| Err(anyhow::anyhow!("action failed")))),
            Some(Action::agnostic(move || {
                *ran_in.lock() = true;
                Ok(())
            })),
        ];

        let Err(err) = execute_chain(&chain, &0) else {
            panic!("expected action error");
        };
        assert_eq!(err.to_string(), "action failed");
        assert!(!*ran.lock());
    }

    #[test]
    fn debug_log_action_succeeds() {
        let action = Action::<&str>::debug_log();
        assert!(action.execute(&"hello").is_ok());
        assert!(format!("{action:?}").contains("Aware"));
    }
}
