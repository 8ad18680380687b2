//! Conditional listener bound to a single [`AtomEvent`].
//!
//! On every raised item an [`EventListener`] runs, in order:
//!
//! 1. its condition chain under the configured [`ConditionOperator`],
//! 2. the direct response (if any),
//! 3. its action chain.
//!
//! Steps 2 and 3 only run when step 1 decides to respond. Nothing is
//! isolated: the first error from any step is returned to the raiser.

use std::fmt;
use std::sync::Arc;

use super::action::{Action, execute_chain};
use super::condition::{Condition, ConditionOperator, evaluate_chain};
use super::event::{AtomEvent, AtomListener};
use super::lifecycle::{ActivationState, Lifecycle};
use super::ListenerId;
use crate::error::{AtomError, AtomResult};

/// Direct response handler invoked before the action chain.
pub type Response<T> = Arc<dyn Fn(&T) -> AtomResult + Send + Sync>;

/// Listener that reacts to an event when its conditions allow it.
///
/// A listener without an event is inert: activation and deactivation
/// succeed and do nothing else.
pub struct EventListener<T> {
    id: ListenerId,
    event: Option<Arc<AtomEvent<T>>>,
    response: Option<Response<T>>,
    conditions: Vec<Option<Condition<T>>>,
    actions: Vec<Option<Action<T>>>,
    operator: ConditionOperator,
    replay_on_register: bool,
    state: ActivationState,
}

impl<T> fmt::Debug for EventListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("id", &self.id)
            .field("bound", &self.event.is_some())
            .field("has_response", &self.response.is_some())
            .field("conditions", &self.conditions)
            .field("actions", &self.actions)
            .field("operator", &self.operator)
            .field("replay_on_register", &self.replay_on_register)
            .field("state", &self.state)
            .finish()
    }
}

impl<T> EventListener<T> {
    /// Starts building a listener.
    #[must_use]
    pub fn builder() -> EventListenerBuilder<T> {
        EventListenerBuilder::default()
    }

    /// Returns the listener id.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Returns the bound event, if any.
    #[must_use]
    pub const fn event(&self) -> Option<&Arc<AtomEvent<T>>> {
        self.event.as_ref()
    }

    /// Returns the logical operator applied to the condition chain.
    #[must_use]
    pub const fn operator(&self) -> ConditionOperator {
        self.operator
    }

    /// Returns `true` if buffered items are replayed on activation.
    #[must_use]
    pub const fn replays_on_register(&self) -> bool {
        self.replay_on_register
    }

    /// Runs the dispatch algorithm for one item.
    ///
    /// # Errors
    ///
    /// Returns the first error from a condition, the response or an action.
    pub fn dispatch(&self, item: &T) -> AtomResult {
        if !evaluate_chain(self.operator, &self.conditions, item)? {
            return Ok(());
        }

        if let Some(response) = &self.response {
            response(item)?;
        }
        execute_chain(&self.actions, item)
    }
}

impl<T> AtomListener<T> for EventListener<T>
where
    T: Send + Sync,
{
    fn listener_id(&self) -> ListenerId {
        self.id
    }

    fn on_event_raised(&self, item: &T) -> AtomResult {
        self.dispatch(item)
    }
}

impl<T> Lifecycle for EventListener<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn activate(self: Arc<Self>) -> AtomResult {
        if !self.state.enter() {
            return Err(AtomError::listener_already_active(self.id).into());
        }
        if let Some(event) = &self.event {
            let listener = Arc::clone(&self) as Arc<dyn AtomListener<T>>;
            event.register_listener(listener, self.replay_on_register)?;
        }
        Ok(())
    }

    fn deactivate(self: Arc<Self>) -> AtomResult {
        if !self.state.exit() {
            return Err(AtomError::listener_not_active(self.id).into());
        }
        if let Some(event) = &self.event {
            event.unregister_listener(self.id);
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Builder for [`EventListener`].
///
/// Conditions and actions keep the order in which they are added. Use
/// [`EventListenerBuilder::empty_condition`] / [`EventListenerBuilder::empty_action`]
/// to reproduce unset slots from a pre-loaded configuration.
pub struct EventListenerBuilder<T> {
    event: Option<Arc<AtomEvent<T>>>,
    response: Option<Response<T>>,
    conditions: Vec<Option<Condition<T>>>,
    actions: Vec<Option<Action<T>>>,
    operator: ConditionOperator,
    replay_on_register: bool,
}

impl<T> Default for EventListenerBuilder<T> {
    fn default() -> Self {
        Self {
            event: None,
            response: None,
            conditions: Vec::new(),
            actions: Vec::new(),
            operator: ConditionOperator::And,
            replay_on_register: false,
        }
    }
}

impl<T> fmt::Debug for EventListenerBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListenerBuilder")
            .field("bound", &self.event.is_some())
            .field("conditions", &self.conditions.len())
            .field("actions", &self.actions.len())
            .field("operator", &self.operator)
            .finish_non_exhaustive()
    }
}

impl<T> EventListenerBuilder<T> {
    /// Binds the listener to `event`.
    #[must_use]
    pub fn event(mut self, event: Arc<AtomEvent<T>>) -> Self {
        self.event = Some(event);
        self
    }

    /// Sets the direct response handler.
    #[must_use]
    pub fn response<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> AtomResult + Send + Sync + 'static,
    {
        self.response = Some(Arc::new(f));
        self
    }

    /// Appends a condition.
    #[must_use]
    pub fn condition(mut self, condition: Condition<T>) -> Self {
        self.conditions.push(Some(condition));
        self
    }

    /// Appends an unset condition slot.
    #[must_use]
    pub fn empty_condition(mut self) -> Self {
        self.conditions.push(None);
        self
    }

    /// Appends an action.
    #[must_use]
    pub fn action(mut self, action: Action<T>) -> Self {
        self.actions.push(Some(action));
        self
    }

    /// Appends an unset action slot.
    #[must_use]
    pub fn empty_action(mut self) -> Self {
        self.actions.push(None);
        self
    }

    /// Sets the logical operator (default [`ConditionOperator::And`]).
    #[must_use]
    pub fn operator(mut self, operator: ConditionOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Replays the event's buffered items when the listener activates.
    #[must_use]
    pub fn replay_on_register(mut self, replay: bool) -> Self {
        self.replay_on_register = replay;
        self
    }

    /// Finishes the listener. It starts inactive.
    #[must_use]
    pub fn build(self) -> EventListener<T> {
        EventListener {
            id: ListenerId::new(),
            event: self.event,
            response: self.response,
            conditions: self.conditions,
            actions: self.actions,
            operator: self.operator,
            replay_on_register: self.replay_on_register,
            state: ActivationState::new(),
        }
    }
}
