//! Transition rules and the per-node tables that hold them.
//!
//! # Key Concepts
//!
//! - **Rule**: an unconditional target, a condition plus target, or a full
//!   function; all normalize to "machine and data in, optional target out"
//! - **Table**: one ordered rule list per tick phase plus one per event tag
//! - **First match wins**: lists are scanned in registration order and the
//!   first rule yielding a target ends the scan

mod rule;
mod table;

pub use rule::Rule;
pub use table::TransitionTable;
