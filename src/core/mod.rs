//! Core vocabulary shared by every part of the runtime.
//!
//! - Tags identifying states and events via the `Tag` trait
//! - The three tick phases and the lifecycle hooks they map onto
//! - Clocks used to measure time-in-state
//! - Bounded transition history

mod clock;
mod history;
mod phase;
mod tag;

pub use clock::{Clock, ManualClock, SystemClock};
pub use history::{StateHistory, StateTransition, TransitionCause};
pub use phase::{Hook, Phase};
pub use tag::{NoEvent, Tag};
