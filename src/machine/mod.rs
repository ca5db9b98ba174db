//! The state machine runtime.
//!
//! A [`StateMachine`] owns its nodes, the current/previous/next state, the
//! in-state clock and the dispatch algorithm that ties lifecycle hooks and
//! transition rules together.

mod nodes;
mod state_machine;

pub use nodes::NodeSet;
pub use state_machine::{Lifecycle, SharedMachine, StateMachine};
