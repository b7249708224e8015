//! Stable exit codes for the `tdgen` CLI.

/// Generated code satisfies the specification (or a non-run command succeeded).
pub const OK: i32 = 0;
/// Invalid config/arguments, I/O failure, or a fatal capability error.
pub const INVALID: i32 = 1;
/// The iteration budget ran out before the code passed its tests.
pub const NONCOMPLIANT: i32 = 2;
