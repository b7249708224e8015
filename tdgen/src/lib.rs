//! Test-driven code generation loop.
//!
//! Given a specification (typically a test case), the generator asks a code
//! generation capability for an implementation, runs it through a test
//! capability, and retries until the tests pass or the iteration budget is
//! spent. The crate keeps a strict split:
//!
//! - **[`core`]**: Pure value types ([`core::status::Status`],
//!   [`core::outcome::GenerationOutcome`]) and helpers. No I/O.
//! - **[`generator`]**: The loop itself, written against the
//!   [`generator::CodeClient`] and [`generator::TestRunner`] traits.
//! - **[`io`]**: Process-backed implementations of those traits, the TOML
//!   config, and the on-disk iteration log.
//!
//! [`run`] wires the three together for the `tdgen` binary.

pub mod core;
pub mod exit_codes;
pub mod generator;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::outcome::GenerationOutcome;
pub use crate::core::status::{State, Status};
pub use crate::generator::{
    CodeClient, DEFAULT_ITERATION_LIMIT, Generator, GeneratorError, TestRunner,
};
