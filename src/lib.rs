//! # event-atoms
//!
//! Typed in-process events with declarative, conditional listeners.
//!
//! Producers raise items on an [`domain::AtomEvent`] without knowing who
//! consumes them. Consumers are [`domain::EventListener`]s: each one gates
//! an item through an ordered condition chain (combined with AND or OR,
//! short-circuiting), then runs an optional direct response followed by an
//! ordered action chain. Everything is synchronous: `raise` returns after
//! every listener has run.
//!
//! Shared list state lives in [`domain::ValueList`], which announces clears
//! and can start cleared on activation. Under a persistent reload mode such
//! lists enroll in a [`domain::ResetRegistry`] so a reload signal empties
//! them even when activation does not run again.
//!
//! ## Architecture
//!
//! ```text
//! AtomEvent<T>::raise(item)
//!     │
//!     ├── EventListener (registration order)
//!     │       ├── Condition chain (AND / OR short-circuit)
//!     │       ├── direct response
//!     │       └── Action chain
//!     │
//! AtomHost (service/)
//!     ├── activate / deactivate units
//!     └── reload ── ResetRegistry ── ValueList::clear ── cleared event
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod service;
