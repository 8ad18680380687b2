//! Domain layer: events, listeners, condition/action chains and lists.
//!
//! This module contains the in-process event channel, the conditional
//! listener that consumes it, the ordered condition and action chains the
//! listener evaluates, and the cleared-list container with its reload
//! reset registry.

pub mod action;
pub mod condition;
pub mod event;
pub mod lifecycle;
pub mod listener;
pub mod listener_id;
pub mod reset_registry;
pub mod value_list;

pub use action::Action;
pub use condition::{Condition, ConditionOperator};
pub use event::{AtomEvent, AtomListener};
pub use lifecycle::{ActivationState, Lifecycle};
pub use listener::{EventListener, EventListenerBuilder};
pub use listener_id::{ContainerId, ListenerId};
pub use reset_registry::{ReloadMode, ResetRegistry};
pub use value_list::{AnyValueList, ValueList};
