//! Host-driven activation lifecycle.
//!
//! A host calls [`Lifecycle::activate`] and [`Lifecycle::deactivate`] exactly
//! once per transition. Units track their state with an [`ActivationState`]
//! so that an out-of-order call is reported as an [`AtomError`] instead of
//! silently registering twice.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AtomResult;

/// Two-method lifecycle implemented by listeners and containers.
///
/// Receivers take `Arc<Self>` because activation may hand the unit itself to
/// an event registry or to the reset registry.
pub trait Lifecycle: Send + Sync + fmt::Debug {
    /// Runs the unit's activation hook.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AtomError::AlreadyActive`] if the unit is
    /// already active, or the first consumer error raised while the hook ran
    /// (for example by a replayed item or a cleared notification).
    fn activate(self: Arc<Self>) -> AtomResult;

    /// Runs the unit's deactivation hook.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AtomError::NotActive`] if the unit is not
    /// active.
    fn deactivate(self: Arc<Self>) -> AtomResult;

    /// Returns `true` between a successful activate and the matching
    /// deactivate.
    fn is_active(&self) -> bool;
}

/// Active/inactive flag with checked transitions.
#[derive(Debug, Default)]
pub struct ActivationState {
    active: AtomicBool,
}

impl ActivationState {
    /// Creates an inactive state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the unit active. Returns `false` if it already was.
    pub fn enter(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Marks the unit inactive. Returns `false` if it already was.
    pub fn exit(&self) -> bool {
        self.active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns the current state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_active() { "active" } else { "inactive" })
    }
}
