//! Pure value types and helpers for the generation loop.
//!
//! Nothing in here performs I/O; everything is deterministic and testable in
//! isolation.

pub mod extract;
pub mod outcome;
pub mod status;
