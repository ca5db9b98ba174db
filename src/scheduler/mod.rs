//! Registering machines and ticking them once per frame.
//!
//! # Key Concepts
//!
//! - **Registry**: the seam machines register through. Injected per machine,
//!   so tests can substitute a spy
//! - **Scheduler**: the standard registry; keeps a live list in registration
//!   order and a pending-removal set so that machines may come and go from
//!   inside callbacks while a phase is being ticked
//! - **CloseOnDrop**: ties a machine's lifetime to its owner's

mod closer;
mod registry;
#[allow(clippy::module_inception)]
mod scheduler;

pub use closer::CloseOnDrop;
pub use registry::{MachineId, Registry, Tickable};
pub use scheduler::Scheduler;
