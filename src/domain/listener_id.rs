//! Type-safe identity keys for listeners and containers.
//!
//! Event registries and the reset registry are keyed by identity, not by
//! value. [`ListenerId`] and [`ContainerId`] wrap a [`uuid::Uuid`] (v4) so
//! the two kinds of key cannot be confused.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id! {
    /// Identity of a listener registered with an [`super::AtomEvent`].
    ///
    /// Generated once when the listener is built; stable for its lifetime.
    ListenerId
}

uuid_id! {
    /// Identity of a [`super::ValueList`], used to deduplicate reset
    /// registry enrollment.
    ContainerId
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ListenerId::new(), ListenerId::new());
        assert_ne!(ContainerId::new(), ContainerId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let s = ListenerId::new().to_string();
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serde_is_transparent() {
        let uuid = uuid::Uuid::new_v4();
        let id = ContainerId::from_uuid(uuid);
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{uuid}\""));
        let Ok(back) = serde_json::from_str::<ContainerId>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(*back.as_uuid(), uuid);
    }
}
