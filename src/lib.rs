//! Tickstate: a declarative, tick-driven state machine runtime
//!
//! Tickstate drives many small finite state machines from a host's frame
//! loop. Each state is described declaratively: lifecycle callbacks, ordered
//! transition rules evaluated during the Update, FixedUpdate and LateUpdate
//! phases, and optional per-event reactions. A central scheduler ticks every
//! machine that has something to do, and tolerates machines coming and going
//! from inside their own callbacks.
//!
//! # Core Concepts
//!
//! - **Tags**: closed enums identifying states and events via the `Tag` trait
//! - **Nodes**: per-state callbacks, transition rules and an optional data slot
//! - **Any-state overlay**: a node that runs alongside whichever state is active
//! - **Rules**: first-match-wins predicates keyed by phase or by event
//! - **Scheduler**: ticks registered machines in registration order
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//! use tickstate::prelude::*;
//!
//! tag_enum! {
//!     enum Jump { Grounded, Airborne }
//! }
//!
//! let scheduler = Scheduler::new_shared();
//! let clock = Rc::new(ManualClock::new());
//! let mut builder = StateMachineBuilder::<Jump>::with_registry(scheduler.clone())
//!     .clock(clock.clone());
//!
//! builder
//!     .state(Jump::Grounded)
//!     .transition(Phase::Update, Rule::to(Jump::Airborne));
//! builder.state(Jump::Airborne).transition(
//!     Phase::Update,
//!     Rule::when(|fsm| fsm.time_in_state() >= Duration::from_millis(500), Jump::Grounded),
//! );
//!
//! let player = builder.initialize(Jump::Grounded).unwrap();
//!
//! scheduler.update().unwrap();
//! assert_eq!(player.borrow().current_state(), Jump::Airborne);
//!
//! clock.advance(Duration::from_millis(500));
//! scheduler.update().unwrap();
//! assert_eq!(player.borrow().current_state(), Jump::Grounded);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod machine;
pub mod node;
pub mod scheduler;
pub mod transition;

// Re-export commonly used types
pub use builder::StateMachineBuilder;
pub use config::{MachineConfig, SchedulerConfig};
pub use crate::core::{Phase, StateHistory, StateTransition, Tag};
pub use error::FsmError;
pub use machine::{SharedMachine, StateMachine};
pub use scheduler::Scheduler;

/// Everything needed to declare and drive machines.
pub mod prelude {
    pub use crate::builder::StateMachineBuilder;
    pub use crate::config::{MachineConfig, SchedulerConfig};
    pub use crate::core::{Clock, ManualClock, NoEvent, Phase, SystemClock, Tag, TransitionCause};
    pub use crate::error::FsmError;
    pub use crate::machine::{Lifecycle, SharedMachine, StateMachine};
    pub use crate::node::{DataSlot, StateNode};
    pub use crate::scheduler::{CloseOnDrop, Registry, Scheduler};
    pub use crate::tag_enum;
    pub use crate::transition::Rule;
}
