//! Reload-scoped registry of containers that must be force-cleared.
//!
//! When the host runs in [`ReloadMode::Persistent`], objects can survive a
//! reload boundary without their activation hooks running again. Containers
//! that start cleared enroll here on activation, and
//! [`ResetRegistry::on_reload_signal`] clears every member. Membership is
//! never dropped by a reload; a fresh registry is built only when the
//! process or subsystem itself restarts. Lists keep their registry alive
//! while the registry only holds weak handles to them, so dropping a list
//! is enough to retire it.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::ContainerId;
use super::value_list::AnyValueList;
use crate::error::{AtomError, AtomResult};

/// How object state behaves across a reload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadMode {
    /// Reload tears everything down; activation hooks run again.
    #[default]
    Standard,
    /// Object state may persist across reload; enrolled containers are
    /// cleared by the reload signal instead.
    Persistent,
}

impl ReloadMode {
    /// Returns `true` if state may survive a reload.
    #[must_use]
    pub const fn persists_state(self) -> bool {
        matches!(self, Self::Persistent)
    }
}

impl fmt::Display for ReloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Persistent => "persistent",
        })
    }
}

impl FromStr for ReloadMode {
    type Err = AtomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "persistent" => Ok(Self::Persistent),
            other => Err(AtomError::InvalidConfig(format!(
                "unknown reload mode `{other}` (expected `standard` or `persistent`)"
            ))),
        }
    }
}

/// Injectable registry of containers cleared on every reload signal.
///
/// Members are held weakly: a container that every owner has dropped leaves
/// the registry instead of being kept alive by it.
pub struct ResetRegistry {
    mode: ReloadMode,
    members: Mutex<Vec<Weak<dyn AnyValueList>>>,
}

impl fmt::Debug for ResetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetRegistry")
            .field("mode", &self.mode)
            .field("members", &self.len())
            .finish()
    }
}

impl ResetRegistry {
    /// Creates an empty registry for the given mode.
    #[must_use]
    pub fn new(mode: ReloadMode) -> Self {
        Self {
            mode,
            members: Mutex::new(Vec::new()),
        }
    }

    /// Creates an empty registry using [`crate::config::AtomsConfig::reload_mode`].
    #[must_use]
    pub fn from_config(config: &crate::config::AtomsConfig) -> Self {
        Self::new(config.reload_mode)
    }

    /// Returns the reload mode.
    #[must_use]
    pub const fn mode(&self) -> ReloadMode {
        self.mode
    }

    /// Adds `member` unless a container with the same id is already
    /// enrolled. Returns `true` if it was added.
    pub fn enroll(&self, member: Arc<dyn AnyValueList>) -> bool {
        let id = member.container_id();
        let mut members = self.members.lock();
        members.retain(|m| m.strong_count() > 0);
        if members
            .iter()
            .filter_map(Weak::upgrade)
            .any(|m| m.container_id() == id)
        {
            return false;
        }
        members.push(Arc::downgrade(&member));
        tracing::debug!(container = %id, "container enrolled for reload reset");
        true
    }

    /// Returns `true` if the live container with `id` is enrolled.
    #[must_use]
    pub fn contains(&self, id: ContainerId) -> bool {
        self.live_members().iter().any(|m| m.container_id() == id)
    }

    /// Returns the number of enrolled containers that are still alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members
            .lock()
            .iter()
            .filter(|m| m.strong_count() > 0)
            .count()
    }

    /// Returns `true` if no live container is enrolled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears every live enrolled container, in enrollment order, and drops
    /// entries whose container is gone.
    ///
    /// Live members stay enrolled for later signals.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a cleared notification; remaining
    /// members are not cleared.
    pub fn on_reload_signal(&self) -> AtomResult {
        let members = {
            let mut members = self.members.lock();
            members.retain(|m| m.strong_count() > 0);
            members.iter().filter_map(Weak::upgrade).collect::<Vec<_>>()
        };
        tracing::info!(members = members.len(), "reload signal: clearing enrolled containers");
        for member in members {
            member.clear()?;
        }
        Ok(())
    }

    /// Upgrades every enrolled container that is still alive.
    fn live_members(&self) -> Vec<Arc<dyn AnyValueList>> {
        self.members.lock().iter().filter_map(Weak::upgrade).collect()
    }
}

impl Default for ResetRegistry {
    fn default() -> Self {
        Self::new(ReloadMode::default())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AtomEvent, Lifecycle, ValueList};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_list(
        registry: &Arc<ResetRegistry>,
        counter: &Arc<AtomicUsize>,
    ) -> Arc<ValueList<u32>> {
        let cleared = Arc::new(AtomEvent::<()>::new());
        let counter = Arc::clone(counter);
        cleared.observe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        Arc::new(
            ValueList::new()
                .with_cleared_event(cleared)
                .with_reset_registry(Arc::clone(registry))
                .start_cleared(true),
        )
    }

    #[test]
    fn reload_clears_every_member_each_time() {
        let registry = Arc::new(ResetRegistry::new(ReloadMode::Persistent));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let a = counted_list(&registry, &first);
        let b = counted_list(&registry, &second);

        assert!(Arc::clone(&a).activate().is_ok());
        assert!(Arc::clone(&b).activate().is_ok());
        assert_eq!(registry.len(), 2);
        // One clear each from activation.
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        assert!(a.add(1).is_ok());
        assert!(b.add(2).is_ok());
        assert!(registry.on_reload_signal().is_ok());
        assert!(a.is_empty());
        assert!(b.is_empty());
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);

        assert!(registry.on_reload_signal().is_ok());
        assert_eq!(first.load(Ordering::SeqCst), 3);
        assert_eq!(second.load(Ordering::SeqCst), 3);
        assert!(registry.contains(a.id()));
        assert!(registry.contains(b.id()));
    }

    #[test]
    fn standard_mode_does_not_enroll() {
        let registry = Arc::new(ResetRegistry::new(ReloadMode::Standard));
        let counter = Arc::new(AtomicUsize::new(0));
        let list = counted_list(&registry, &counter);

        assert!(Arc::clone(&list).activate().is_ok());
        assert!(registry.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(registry.on_reload_signal().is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn enrollment_is_deduplicated() {
        let registry = Arc::new(ResetRegistry::new(ReloadMode::Persistent));
        let list: Arc<ValueList<u32>> = Arc::new(ValueList::new());
        assert!(registry.enroll(Arc::clone(&list) as Arc<dyn AnyValueList>));
        assert!(!registry.enroll(Arc::clone(&list) as Arc<dyn AnyValueList>));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn enrolled_list_and_registry_are_freed_when_dropped() {
        let registry = Arc::new(ResetRegistry::new(ReloadMode::Persistent));
        let counter = Arc::new(AtomicUsize::new(0));
        let list = counted_list(&registry, &counter);
        assert!(Arc::clone(&list).activate().is_ok());
        assert!(Arc::clone(&list).deactivate().is_ok());
        assert!(registry.contains(list.id()));

        let weak_list = Arc::downgrade(&list);
        let weak_registry = Arc::downgrade(&registry);
        drop(list);
        drop(registry);

        assert!(weak_list.upgrade().is_none());
        assert!(weak_registry.upgrade().is_none());
    }

    #[test]
    fn dropped_members_leave_the_registry() {
        let registry = Arc::new(ResetRegistry::new(ReloadMode::Persistent));
        let kept_count = Arc::new(AtomicUsize::new(0));
        let dropped_count = Arc::new(AtomicUsize::new(0));
        let kept = counted_list(&registry, &kept_count);
        let dropped = counted_list(&registry, &dropped_count);
        assert!(Arc::clone(&kept).activate().is_ok());
        assert!(Arc::clone(&dropped).activate().is_ok());
        assert_eq!(registry.len(), 2);

        let dropped_id = dropped.id();
        drop(dropped);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(dropped_id));

        assert!(registry.on_reload_signal().is_ok());
        assert_eq!(kept_count.load(Ordering::SeqCst), 2);
        assert_eq!(dropped_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reload_mode_parses_and_displays() {
        let Ok(mode) = " Persistent ".parse::<ReloadMode>() else {
            panic!("valid mode");
        };
        assert_eq!(mode, ReloadMode::Persistent);
        assert!(mode.persists_state());
        assert_eq!(ReloadMode::Standard.to_string(), "standard");

        let Err(err) = "hot".parse::<ReloadMode>() else {
            panic!("invalid mode must fail");
        };
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn reload_mode_serde() {
        let Ok(json) = serde_json::to_string(&ReloadMode::Persistent) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"persistent\"");
    }
}
