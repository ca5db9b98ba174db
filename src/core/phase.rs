//! Per-frame tick phases and the lifecycle hooks they map onto.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three per-frame moments in which a machine is ticked and its
/// automatic transitions are evaluated.
///
/// The host drives the phases once per frame, always in the order
/// `Update`, `FixedUpdate`, `LateUpdate`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Phase {
    Update,
    FixedUpdate,
    LateUpdate,
}

impl Phase {
    /// All phases in frame order.
    pub const ALL: [Phase; 3] = [Phase::Update, Phase::FixedUpdate, Phase::LateUpdate];

    pub(crate) fn index(self) -> usize {
        match self {
            Phase::Update => 0,
            Phase::FixedUpdate => 1,
            Phase::LateUpdate => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Update => "update",
            Phase::FixedUpdate => "fixed_update",
            Phase::LateUpdate => "late_update",
        };
        f.write_str(name)
    }
}

/// Lifecycle callback slot on a state node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Hook {
    Enter,
    Exit,
    Update,
    FixedUpdate,
    LateUpdate,
}

impl Hook {
    pub(crate) fn index(self) -> usize {
        match self {
            Hook::Enter => 0,
            Hook::Exit => 1,
            Hook::Update => 2,
            Hook::FixedUpdate => 3,
            Hook::LateUpdate => 4,
        }
    }
}

impl From<Phase> for Hook {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Update => Hook::Update,
            Phase::FixedUpdate => Hook::FixedUpdate,
            Phase::LateUpdate => Hook::LateUpdate,
        }
    }
}
