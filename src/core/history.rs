//! State transition history tracking.
//!
//! Every completed transition is recorded into a bounded log so user code can
//! inspect the recent path a machine took. The oldest records are dropped once
//! the configured capacity is reached.

use super::phase::Phase;
use super::tag::Tag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// What caused a transition to be taken.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum TransitionCause<E: Tag> {
    /// `set_state` was called directly.
    Direct,
    /// An automatic rule matched while ticking the given phase.
    Phase(Phase),
    /// A rule bound to the given event matched.
    Event(E),
}

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use chrono::Utc;
/// use tickstate::core::{NoEvent, StateTransition, TransitionCause};
/// use tickstate::tag_enum;
///
/// tag_enum! {
///     enum Light { Red, Green }
/// }
///
/// let transition: StateTransition<Light, NoEvent> = StateTransition {
///     from: Light::Red,
///     to: Light::Green,
///     cause: TransitionCause::Direct,
///     timestamp: Utc::now(),
///     time_in_previous: Duration::from_secs(30),
/// };
/// assert_eq!(transition.to, Light::Green);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: Tag, E: Tag> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Why the transition happened
    pub cause: TransitionCause<E>,
    /// When the transition occurred (wall clock)
    pub timestamp: DateTime<Utc>,
    /// How long the machine stayed in `from`, measured by the machine's clock
    pub time_in_previous: Duration,
}

/// Bounded, ordered log of state transitions.
///
/// A deserialized history is clamped to its capacity, keeping the newest
/// records.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "", from = "StoredHistory<S, E>")]
pub struct StateHistory<S: Tag, E: Tag> {
    capacity: usize,
    transitions: VecDeque<StateTransition<S, E>>,
}

#[derive(Deserialize)]
#[serde(bound = "")]
struct StoredHistory<S: Tag, E: Tag> {
    capacity: usize,
    transitions: VecDeque<StateTransition<S, E>>,
}

impl<S: Tag, E: Tag> From<StoredHistory<S, E>> for StateHistory<S, E> {
    fn from(stored: StoredHistory<S, E>) -> Self {
        let StoredHistory {
            capacity,
            mut transitions,
        } = stored;
        let excess = transitions.len().saturating_sub(capacity);
        transitions.drain(..excess);
        Self {
            capacity,
            transitions,
        }
    }
}

impl<S: Tag, E: Tag> StateHistory<S, E> {
    /// Create an empty history keeping at most `capacity` records.
    ///
    /// A capacity of zero disables recording.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Record a transition, evicting the oldest record when full.
    pub fn record(&mut self, transition: StateTransition<S, E>) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained record followed by
    /// the `to` state of every record.
    pub fn get_path(&self) -> Vec<S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Wall-clock span between the oldest and newest retained records.
    ///
    /// Returns `None` if nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S, E>> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition<S, E>> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
