//! Errors reported by the state machine runtime.

use crate::config::ConfigError;
use crate::machine::Lifecycle;
use thiserror::Error;

/// Errors returned by machine operations and by the scheduler's tick loop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FsmError {
    #[error("Cannot {operation}: state machine is {lifecycle}")]
    NotActive {
        operation: &'static str,
        lifecycle: Lifecycle,
    },

    #[error("Transition depth limit ({depth}) exceeded while transitioning to '{target}'")]
    TransitionDepthExceeded { target: String, depth: usize },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
