//! Service layer: lifecycle orchestration.
//!
//! [`AtomHost`] activates and deactivates listeners and lists as a group and
//! forwards reload signals to the [`super::domain::ResetRegistry`].

pub mod atom_host;

pub use atom_host::AtomHost;
