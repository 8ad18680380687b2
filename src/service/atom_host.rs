//! Host service: drives the lifecycle of a set of units.
//!
//! [`AtomHost`] stands in for the runtime that owns listeners and lists. It
//! activates units in insertion order, deactivates them in reverse, and
//! forwards reload signals to its [`ResetRegistry`].

use std::sync::Arc;

use crate::config::AtomsConfig;
use crate::domain::{Lifecycle, ResetRegistry};
use crate::error::AtomResult;

/// Lifecycle driver for listeners and containers.
///
/// Holds the shared [`ResetRegistry`] so that containers built against
/// [`AtomHost::registry`] are reset by [`AtomHost::reload`].
#[derive(Debug)]
pub struct AtomHost {
    registry: Arc<ResetRegistry>,
    units: Vec<Arc<dyn Lifecycle>>,
}

impl AtomHost {
    /// Creates a host around an existing registry.
    #[must_use]
    pub fn new(registry: Arc<ResetRegistry>) -> Self {
        Self {
            registry,
            units: Vec::new(),
        }
    }

    /// Creates a host with a fresh registry for the configured reload mode.
    #[must_use]
    pub fn from_config(config: &AtomsConfig) -> Self {
        Self::new(Arc::new(ResetRegistry::from_config(config)))
    }

    /// Returns the shared reset registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResetRegistry> {
        &self.registry
    }

    /// Adds a unit. It is activated by the next [`AtomHost::start`].
    pub fn add_unit<U>(&mut self, unit: Arc<U>)
    where
        U: Lifecycle + 'static,
    {
        self.units.push(unit);
    }

    /// Returns the number of managed units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Activates every unit in insertion order.
    ///
    /// If a unit fails, every unit this call activated (the failing one
    /// included, when it was left active) is deactivated in reverse order
    /// before the error is returned, so the host can be started again.
    ///
    /// # Errors
    ///
    /// Returns the first activation error; later units stay inactive.
    pub fn start(&self) -> AtomResult {
        for (index, unit) in self.units.iter().enumerate() {
            let was_active = unit.is_active();
            if let Err(err) = Arc::clone(unit).activate() {
                let failed = (!was_active && unit.is_active()).then_some(unit);
                Self::roll_back(failed.into_iter().chain(self.units.iter().take(index).rev()));
                tracing::warn!(unit = index, error = %err, "host start failed");
                return Err(err);
            }
        }
        tracing::info!(units = self.units.len(), "host started");
        Ok(())
    }

    /// Deactivates `units` in the given order, logging rather than returning
    /// failures so the original activation error reaches the caller.
    fn roll_back<'a>(units: impl Iterator<Item = &'a Arc<dyn Lifecycle>>) {
        for unit in units {
            if let Err(err) = Arc::clone(unit).deactivate() {
                tracing::warn!(error = %err, "rollback deactivation failed");
            }
        }
    }

    /// Deactivates every unit in reverse insertion order.
    ///
    /// # Errors
    ///
    /// Returns the first deactivation error; earlier units stay active.
    pub fn stop(&self) -> AtomResult {
        for unit in self.units.iter().rev() {
            Arc::clone(unit).deactivate()?;
        }
        tracing::info!(units = self.units.len(), "host stopped");
        Ok(())
    }

    /// Fires one reload signal.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while clearing enrolled containers.
    pub fn reload(&self) -> AtomResult {
        self.registry.on_reload_signal()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AtomEvent, Condition, EventListener, ReloadMode, ValueList};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn host(mode: ReloadMode) -> AtomHost {
        let config = AtomsConfig {
            reload_mode: mode,
            ..AtomsConfig::default()
        };
        AtomHost::from_config(&config)
    }

    #[test]
    fn listener_feeds_list_until_stopped() {
        let mut host = host(ReloadMode::Standard);
        let scores = Arc::new(AtomEvent::<u32>::new());
        let high = Arc::new(ValueList::<u32>::new().with_reset_registry(Arc::clone(host.registry())));

        let sink = Arc::clone(&high);
        let listener = Arc::new(
            EventListener::builder()
                .event(Arc::clone(&scores))
                .condition(Condition::aware(|s: &u32| Ok(*s >= 100)))
                .response(move |s| sink.add(*s))
                .build(),
        );
        host.add_unit(Arc::clone(&high));
        host.add_unit(Arc::clone(&listener));
        assert_eq!(host.unit_count(), 2);

        assert!(host.start().is_ok());
        for score in [50, 120, 99, 300] {
            assert!(scores.raise(score).is_ok());
        }
        assert_eq!(high.to_vec(), vec![120, 300]);

        assert!(host.stop().is_ok());
        assert!(scores.raise(500).is_ok());
        assert_eq!(high.len(), 2);
        assert_eq!(scores.listener_count(), 0);
    }

    #[test]
    fn reload_resets_start_cleared_lists_in_persistent_mode() {
        let mut host = host(ReloadMode::Persistent);
        let cleared = Arc::new(AtomEvent::<()>::new());
        let clears = Arc::new(Mutex::new(0));
        let clears_in = Arc::clone(&clears);
        cleared.observe(move |_| {
            *clears_in.lock() += 1;
            Ok(())
        });

        let inventory = Arc::new(
            ValueList::from_items(vec!["sword".to_string()])
                .with_cleared_event(cleared)
                .with_reset_registry(Arc::clone(host.registry()))
                .start_cleared(true),
        );
        host.add_unit(Arc::clone(&inventory));

        assert!(host.start().is_ok());
        assert!(inventory.is_empty());
        assert!(inventory.add("shield".to_string()).is_ok());

        assert!(host.reload().is_ok());
        assert!(inventory.is_empty());
        assert_eq!(*clears.lock(), 2);
        assert!(inventory.is_active());
    }

    #[test]
    fn failed_start_rolls_back_and_can_be_retried() {
        let mut host = host(ReloadMode::Standard);
        let scores = Arc::new(AtomEvent::<u32>::with_replay_buffer(1));
        assert!(scores.raise(7).is_ok());

        let first = Arc::new(ValueList::<u32>::new());
        let last = Arc::new(ValueList::<u32>::new());
        let fail = Arc::new(AtomicBool::new(true));
        let fail_in = Arc::clone(&fail);
        let listener = Arc::new(
            EventListener::builder()
                .event(Arc::clone(&scores))
                .response(move |_| {
                    if fail_in.load(Ordering::SeqCst) {
                        anyhow::bail!("replay failed");
                    }
                    Ok(())
                })
                .replay_on_register(true)
                .build(),
        );
        host.add_unit(Arc::clone(&first));
        host.add_unit(Arc::clone(&listener));
        host.add_unit(Arc::clone(&last));

        let Err(err) = host.start() else {
            panic!("replay failure must fail the start");
        };
        assert_eq!(err.to_string(), "replay failed");
        assert!(!first.is_active());
        assert!(!listener.is_active());
        assert!(!last.is_active());
        assert_eq!(scores.listener_count(), 0);

        fail.store(false, Ordering::SeqCst);
        assert!(host.start().is_ok());
        assert!(first.is_active());
        assert!(listener.is_active());
        assert!(last.is_active());
        assert!(host.stop().is_ok());
    }

    #[test]
    fn starting_twice_fails() {
        let mut host = host(ReloadMode::Standard);
        host.add_unit(Arc::new(ValueList::<i8>::new()));
        assert!(host.start().is_ok());
        // The second start fails on a unit it did not activate, so nothing
        // is rolled back.
        assert!(host.start().is_err());
        assert!(host.stop().is_ok());
        assert!(host.stop().is_err());
    }
}
