//! Builder API for ergonomic state machine construction.
//!
//! [`StateMachineBuilder`] is the not-yet-initialized machine; the
//! [`tag_enum!`](crate::tag_enum) macro declares state and event tags with
//! minimal boilerplate.

mod machine;
pub mod macros;

pub use machine::StateMachineBuilder;
