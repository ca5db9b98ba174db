//! The seam between machines and whatever ticks them.

use crate::core::Phase;
use crate::error::FsmError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

/// Handle returned by [`Registry::register`], used to deregister later.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct MachineId(pub(crate) u64);

impl MachineId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "machine#{}", self.0)
    }
}

/// A machine as seen by a scheduler: something that can be ticked.
pub trait Tickable {
    fn tick(&mut self, phase: Phase) -> Result<(), FsmError>;

    fn is_active(&self) -> bool;

    fn close(&mut self) -> Result<(), FsmError>;
}

/// Where machines with tick work register themselves.
///
/// Machines register once, at initialize, and only if they have tick
/// callbacks or phase rules. They deregister once, at close. Registrations
/// are weak: a machine dropped without closing is simply gone.
///
/// Both methods may be called while the registry is in the middle of
/// ticking, from inside a machine's callback.
pub trait Registry {
    fn register(&self, machine: Weak<RefCell<dyn Tickable>>) -> MachineId;

    fn deregister(&self, id: MachineId);
}
