//! Ordered mutable container with a cleared notification.
//!
//! [`ValueList`] is shared list state. It can announce clears (and, when
//! configured, adds and removes) through [`AtomEvent`]s, and can start
//! cleared on activation. Under [`super::ReloadMode::Persistent`] a
//! start-cleared list also enrolls in the [`ResetRegistry`] so a reload
//! signal empties it even if activation does not run again.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::ContainerId;
use super::event::AtomEvent;
use super::lifecycle::{ActivationState, Lifecycle};
use super::reset_registry::ResetRegistry;
use crate::error::{AtomError, AtomResult};

/// Type-erased view of a [`ValueList`].
pub trait AnyValueList: Send + Sync + fmt::Debug {
    /// Identity of the container.
    fn container_id(&self) -> ContainerId;

    /// Empties the container and raises its cleared notification.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a cleared listener.
    fn clear(&self) -> AtomResult;

    /// Number of stored values.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds nothing.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a boxed value of the container's element type.
    ///
    /// # Errors
    ///
    /// Returns [`AtomError::TypeMismatch`] if `value` has another type, or
    /// the first error raised by an added listener.
    fn add_any(&self, value: Box<dyn Any + Send>) -> AtomResult;
}

/// Shared ordered list with optional change notifications.
pub struct ValueList<T> {
    id: ContainerId,
    items: Mutex<Vec<T>>,
    cleared: Option<Arc<AtomEvent<()>>>,
    added: Option<Arc<AtomEvent<T>>>,
    removed: Option<Arc<AtomEvent<T>>>,
    start_cleared: bool,
    registry: Option<Arc<ResetRegistry>>,
    state: ActivationState,
}

impl<T> fmt::Debug for ValueList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueList")
            .field("id", &self.id)
            .field("len", &self.items.lock().len())
            .field("start_cleared", &self.start_cleared)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T> ValueList<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty list with no notifications.
    #[must_use]
    pub fn new() -> Self {
        Self::from_items(Vec::new())
    }

    /// Creates a list holding `items`.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            id: ContainerId::new(),
            items: Mutex::new(items),
            cleared: None,
            added: None,
            removed: None,
            start_cleared: false,
            registry: None,
            state: ActivationState::new(),
        }
    }

    /// Raises `event` after every [`ValueList::clear`].
    #[must_use]
    pub fn with_cleared_event(mut self, event: Arc<AtomEvent<()>>) -> Self {
        self.cleared = Some(event);
        self
    }

    /// Raises `event` with each value passed to [`ValueList::add`].
    #[must_use]
    pub fn with_added_event(mut self, event: Arc<AtomEvent<T>>) -> Self {
        self.added = Some(event);
        self
    }

    /// Raises `event` with each value taken out by [`ValueList::remove`].
    #[must_use]
    pub fn with_removed_event(mut self, event: Arc<AtomEvent<T>>) -> Self {
        self.removed = Some(event);
        self
    }

    /// Registry to enroll in when activating under a persistent reload mode.
    #[must_use]
    pub fn with_reset_registry(mut self, registry: Arc<ResetRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Clears the list on every activation.
    #[must_use]
    pub fn start_cleared(mut self, start_cleared: bool) -> Self {
        self.start_cleared = start_cleared;
        self
    }

    /// Returns the container id.
    #[must_use]
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    /// Returns the cleared event, if configured.
    #[must_use]
    pub const fn cleared_event(&self) -> Option<&Arc<AtomEvent<()>>> {
        self.cleared.as_ref()
    }

    /// Empties the list, then raises the cleared event exactly once, even
    /// when the list was already empty.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a cleared listener. The list is
    /// already empty at that point.
    pub fn clear(&self) -> AtomResult {
        self.items.lock().clear();
        if let Some(event) = &self.cleared {
            event.notify()?;
        }
        Ok(())
    }

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an added listener. The value is
    /// stored regardless.
    pub fn add(&self, value: T) -> AtomResult {
        match &self.added {
            Some(event) => {
                self.items.lock().push(value.clone());
                event.raise(value)
            }
            None => {
                self.items.lock().push(value);
                Ok(())
            }
        }
    }

    /// Returns the value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.lock().get(index).cloned()
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Returns a copy of the contents in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.lock().clone()
    }
}

impl<T> ValueList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Returns `true` if an equal value is stored.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.items.lock().contains(value)
    }

    /// Removes the first value equal to `value`. Returns whether one was
    /// found.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a removed listener.
    pub fn remove(&self, value: &T) -> AtomResult<bool> {
        let taken = {
            let mut items = self.items.lock();
            items
                .iter()
                .position(|v| v == value)
                .map(|index| items.remove(index))
        };
        let Some(taken) = taken else {
            return Ok(false);
        };
        if let Some(event) = &self.removed {
            event.raise(taken)?;
        }
        Ok(true)
    }
}

impl<T> Default for ValueList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AnyValueList for ValueList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn container_id(&self) -> ContainerId {
        self.id
    }

    fn clear(&self) -> AtomResult {
        Self::clear(self)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn add_any(&self, value: Box<dyn Any + Send>) -> AtomResult {
        let value = value.downcast::<T>().map_err(|_| AtomError::TypeMismatch {
            container: self.id,
            expected: type_name::<T>(),
        })?;
        self.add(*value)
    }
}

impl<T> Lifecycle for ValueList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn activate(self: Arc<Self>) -> AtomResult {
        if !self.state.enter() {
            return Err(AtomError::AlreadyActive(format!("container {}", self.id)).into());
        }
        if self.start_cleared {
            if let Some(registry) = &self.registry
                && registry.mode().persists_state()
            {
                let member = Arc::clone(&self) as Arc<dyn AnyValueList>;
                registry.enroll(member);
            }
            self.clear()?;
        }
        Ok(())
    }

    fn deactivate(self: Arc<Self>) -> AtomResult {
        if !self.state.exit() {
            return Err(AtomError::NotActive(format!("container {}", self.id)).into());
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
