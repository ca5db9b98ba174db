//! State nodes.
//!
//! A single generic [`StateNode`] covers stateless and stateful nodes, with or
//! without events: "stateful" just means `D` is not `()`. The machine stores
//! nodes type-erased behind [`Behaviour`], so dispatch never needs to know a
//! node's data type.

mod data;
mod state_node;

pub use data::DataSlot;
pub use state_node::{Callback, StateNode};

use crate::core::{Hook, Phase, Tag};
use crate::machine::StateMachine;
use std::any::Any;
use std::rc::Rc;

/// Data-erased view of a node used by the machine's dispatch loop.
pub(crate) trait Behaviour<S: Tag, E: Tag> {
    /// Restore the data slot to its initial value.
    fn reset(&self);

    /// Run the callback bound to `hook`, if any. Exiting also resets the data
    /// slot once the callback has returned.
    fn run_hook(&self, hook: Hook, fsm: &mut StateMachine<S, E>);

    /// First target produced by this node's `phase` rules.
    fn check_transitions(&self, phase: Phase, fsm: &StateMachine<S, E>) -> Option<S>;

    /// Run the per-event callback, then evaluate the event's rules.
    fn trigger_event(&self, event: E, fsm: &mut StateMachine<S, E>) -> Option<S>;

    /// Whether ticking this node can ever do anything.
    fn has_update_functions(&self) -> bool;

    fn as_any(self: Rc<Self>) -> Rc<dyn Any>;
}
