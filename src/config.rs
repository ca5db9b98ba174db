//! Runtime configuration for machines and the scheduler.
//!
//! Both structs deserialize with every field optional, so hosts can load
//! them from whatever format they already use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on nested `set_state` calls.
pub const DEFAULT_MAX_TRANSITION_DEPTH: usize = 64;

/// Default number of transitions kept in a machine's history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Default size the pending-removal set may reach before compaction.
pub const DEFAULT_CLEANUP_THRESHOLD: usize = 32;

/// Configuration validation errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_transition_depth must be at least 1 (use None to disable the guard)")]
    ZeroTransitionDepth,
}

/// Per-machine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Upper bound on nested transitions (a `set_state` issued from an
    /// enter or exit callback of another transition). `None` disables the
    /// guard and lets runaway recursion exhaust the stack.
    pub max_transition_depth: Option<usize>,

    /// Number of transitions kept in the machine's history. Zero disables it.
    pub history_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_transition_depth: Some(DEFAULT_MAX_TRANSITION_DEPTH),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl MachineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_transition_depth == Some(0) {
            return Err(ConfigError::ZeroTransitionDepth);
        }
        Ok(())
    }
}

/// Scheduler settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// The live list is compacted once more than this many machines are
    /// waiting for removal.
    pub cleanup_threshold: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cleanup_threshold: DEFAULT_CLEANUP_THRESHOLD,
        }
    }
}
