//! Tag trait for state and event identifiers.
//!
//! State machines are generic over a closed, caller-defined domain of state
//! tags and, optionally, a second domain of event tags. Both domains use the
//! same trait.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier drawn from a small, closed domain (usually a fieldless enum).
///
/// # Required Traits
///
/// - `Copy` + `Eq` + `Hash`: tags key the node and rule maps
/// - `Debug`: tags appear in logs and errors
/// - `Serialize` + `Deserialize`: tags appear in exported transition history
///
/// # Example
///
/// ```rust
/// use tickstate::core::Tag;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl Tag for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// assert_eq!(Door::Open.name(), "Open");
/// ```
pub trait Tag: Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static {
    /// Get the tag's name for display/logging.
    fn name(&self) -> &str;
}

/// Event domain of machines that take no discrete events.
///
/// It has no variants, so `trigger_event` can never be called on a machine
/// whose event type is `NoEvent`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NoEvent {}

impl Tag for NoEvent {
    fn name(&self) -> &str {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Idle,
        Walking,
        Jumping,
    }

    impl Tag for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Walking => "Walking",
                Self::Jumping => "Jumping",
            }
        }
    }

    #[test]
    fn tag_name_returns_correct_value() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Walking.name(), "Walking");
        assert_eq!(TestState::Jumping.name(), "Jumping");
    }

    #[test]
    fn tag_serializes_correctly() {
        let tag = TestState::Walking;
        let json = serde_json::to_string(&tag).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, deserialized);
    }

    #[test]
    fn tags_key_hash_maps() {
        let mut seen = std::collections::HashMap::new();
        seen.insert(TestState::Idle, 1);
        seen.insert(TestState::Jumping, 2);

        assert_eq!(seen.get(&TestState::Idle), Some(&1));
        assert_eq!(seen.get(&TestState::Walking), None);
    }

    #[test]
    fn no_event_cannot_be_deserialized() {
        let result: Result<NoEvent, _> = serde_json::from_str("\"Anything\"");
        assert!(result.is_err());
    }
}
