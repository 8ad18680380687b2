//! Error types for the atom runtime.
//!
//! Two kinds of failure exist:
//!
//! - [`AtomError`] covers problems the runtime detects itself: lifecycle
//!   transitions out of order, type-erased inserts with the wrong type, and
//!   malformed configuration.
//! - [`ConsumerError`] is whatever a condition, action, response or listener
//!   returns. The dispatcher never inspects, wraps or retries it; it is handed
//!   back unchanged to the code that raised the event.

use crate::domain::{ContainerId, ListenerId};

/// Error produced by user-supplied conditions, actions and responses.
pub type ConsumerError = anyhow::Error;

/// Result alias for consumer callbacks and everything that drives them.
///
/// Lifecycle and dispatch entry points return this as well: a consumer
/// failure passes through untouched, while runtime-detected problems arrive
/// as an [`AtomError`] that callers can recover with
/// [`anyhow::Error::downcast_ref`].
pub type AtomResult<T = ()> = Result<T, ConsumerError>;

/// Runtime-detected error enum.
///
/// # Error Codes
///
/// | Range     | Category      |
/// |-----------|---------------|
/// | 1000–1999 | Lifecycle     |
/// | 2000–2999 | Container     |
/// | 3000–3999 | Configuration |
#[derive(Debug, thiserror::Error)]
pub enum AtomError {
    /// `activate` was called on a unit that is already active.
    #[error("unit {0} is already active")]
    AlreadyActive(String),

    /// `deactivate` was called on a unit that is not active.
    #[error("unit {0} is not active")]
    NotActive(String),

    /// A type-erased insert received a value of the wrong type.
    #[error("container {container} expects values of type {expected}")]
    TypeMismatch {
        /// Container that rejected the value.
        container: ContainerId,
        /// Element type name the container stores.
        expected: &'static str,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AtomError {
    /// Builds an [`AtomError::AlreadyActive`] for a listener.
    #[must_use]
    pub fn listener_already_active(id: ListenerId) -> Self {
        Self::AlreadyActive(format!("listener {id}"))
    }

    /// Builds an [`AtomError::NotActive`] for a listener.
    #[must_use]
    pub fn listener_not_active(id: ListenerId) -> Self {
        Self::NotActive(format!("listener {id}"))
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::AlreadyActive(_) => 1001,
            Self::NotActive(_) => 1002,
            Self::TypeMismatch { .. } => 2001,
            Self::InvalidConfig(_) => 3001,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_grouped_by_category() {
        let id = ListenerId::new();
        assert_eq!(AtomError::listener_already_active(id).error_code(), 1001);
        assert_eq!(AtomError::listener_not_active(id).error_code(), 1002);
        let mismatch = AtomError::TypeMismatch {
            container: ContainerId::new(),
            expected: "i32",
        };
        assert_eq!(mismatch.error_code(), 2001);
        assert_eq!(AtomError::InvalidConfig("x".into()).error_code(), 3001);
    }

    #[test]
    fn display_names_the_unit() {
        let id = ListenerId::new();
        let msg = AtomError::listener_not_active(id).to_string();
        assert!(msg.contains(&id.to_string()));
        assert!(msg.ends_with("is not active"));
    }
}
