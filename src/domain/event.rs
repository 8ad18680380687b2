//! Typed in-process event channel.
//!
//! [`AtomEvent`] keeps an identity-keyed registry of [`AtomListener`]s and an
//! optional replay buffer of recently raised items. Raising is a plain
//! synchronous call: every registered listener runs, in registration order,
//! before [`AtomEvent::raise`] returns.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::ListenerId;
use crate::error::AtomResult;

/// Receiver side of an [`AtomEvent`].
pub trait AtomListener<T>: Send + Sync {
    /// Identity used as the registry key.
    fn listener_id(&self) -> ListenerId;

    /// Called by the event for every raised (or replayed) item.
    ///
    /// # Errors
    ///
    /// Returns whatever the listener's consumers return; the event does not
    /// inspect it.
    fn on_event_raised(&self, item: &T) -> AtomResult;
}

/// Closure adapter registered through [`AtomEvent::observe`].
struct FnListener<T> {
    id: ListenerId,
    callback: Box<dyn Fn(&T) -> AtomResult + Send + Sync>,
}

impl<T> AtomListener<T> for FnListener<T> {
    fn listener_id(&self) -> ListenerId {
        self.id
    }

    fn on_event_raised(&self, item: &T) -> AtomResult {
        (self.callback)(item)
    }
}

/// Publish point for payloads of type `T`.
///
/// # Reentrancy
///
/// The registry lock is released before any listener runs, so a listener may
/// register, unregister or raise again from inside its callback. Registry
/// changes made during a raise take effect from the next raise. Recursive
/// raising is not guarded against.
pub struct AtomEvent<T> {
    listeners: Mutex<Vec<Arc<dyn AtomListener<T>>>>,
    replay_capacity: usize,
    replay_buffer: Mutex<VecDeque<T>>,
}

impl<T> fmt::Debug for AtomEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomEvent")
            .field("listeners", &self.listeners.lock().len())
            .field("replay_capacity", &self.replay_capacity)
            .field("buffered", &self.replay_buffer.lock().len())
            .finish()
    }
}

impl<T: Clone> AtomEvent<T> {
    /// Creates an event without a replay buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_replay_buffer(0)
    }

    /// Creates an event that retains the `capacity` most recent items for
    /// replay to newly registered listeners.
    #[must_use]
    pub fn with_replay_buffer(capacity: usize) -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            replay_capacity: capacity,
            replay_buffer: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Creates an event sized by [`crate::config::AtomsConfig::replay_buffer_size`].
    #[must_use]
    pub fn from_config(config: &crate::config::AtomsConfig) -> Self {
        Self::with_replay_buffer(config.replay_buffer_size)
    }

    /// Adds `listener` to the registry.
    ///
    /// When `replay` is set, buffered items are delivered to this listener,
    /// oldest first, before the call returns. Registering a listener that is
    /// already registered does nothing.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the listener while replaying.
    pub fn register_listener(&self, listener: Arc<dyn AtomListener<T>>, replay: bool) -> AtomResult {
        let id = listener.listener_id();
        {
            let mut listeners = self.listeners.lock();
            if listeners.iter().any(|l| l.listener_id() == id) {
                tracing::debug!(listener = %id, "listener already registered");
                return Ok(());
            }
            listeners.push(Arc::clone(&listener));
        }
        tracing::debug!(listener = %id, replay, "listener registered");

        if replay {
            let buffered = self.replay_buffer();
            tracing::trace!(listener = %id, items = buffered.len(), "replaying buffered items");
            for item in &buffered {
                listener.on_event_raised(item)?;
            }
        }
        Ok(())
    }

    /// Removes the listener with the given id. No-op if it is not registered.
    pub fn unregister_listener(&self, id: ListenerId) {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| l.listener_id() != id);
        if listeners.len() != before {
            tracing::debug!(listener = %id, "listener unregistered");
        }
    }

    /// Registers a closure as a listener and returns its id.
    ///
    /// The closure never receives replayed items.
    pub fn observe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&T) -> AtomResult + Send + Sync + 'static,
        T: 'static,
    {
        let id = ListenerId::new();
        self.listeners.lock().push(Arc::new(FnListener {
            id,
            callback: Box::new(callback),
        }));
        id
    }

    /// Buffers `item` (if replay is enabled) and delivers it to every
    /// registered listener in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first listener error. Listeners after the failing one are
    /// not invoked for this item.
    pub fn raise(&self, item: T) -> AtomResult {
        if self.replay_capacity > 0 {
            let mut buffer = self.replay_buffer.lock();
            buffer.push_back(item.clone());
            while buffer.len() > self.replay_capacity {
                buffer.pop_front();
            }
        }

        let snapshot = self.listeners.lock().clone();
        for listener in snapshot {
            listener.on_event_raised(&item)?;
        }
        Ok(())
    }

    /// Returns `true` if a listener with the given id is registered.
    #[must_use]
    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.lock().iter().any(|l| l.listener_id() == id)
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Returns a copy of the buffered items, oldest first.
    #[must_use]
    pub fn replay_buffer(&self) -> Vec<T> {
        self.replay_buffer.lock().iter().cloned().collect()
    }

    /// Returns the replay buffer capacity (`0` means no buffering).
    #[must_use]
    pub const fn replay_capacity(&self) -> usize {
        self.replay_capacity
    }

    /// Drops all buffered items.
    pub fn clear_replay_buffer(&self) {
        self.replay_buffer.lock().clear();
    }
}

impl AtomEvent<()> {
    /// Raises a payload-less notification.
    ///
    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn notify(&self) -> AtomResult {
        self.raise(())
    }
}

impl<T: Clone> Default for AtomEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}
