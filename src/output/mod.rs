//! Finished-sequence housekeeping.

/// Output frame renumbering.
pub mod rename;
