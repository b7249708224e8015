//! The generate → verify → retry loop.
//!
//! [`Generator`] drives two injected capabilities: a [`CodeClient`] that turns
//! a specification into candidate code, and a [`TestRunner`] that checks the
//! candidate and returns diagnostics (empty means pass). Every transition is
//! reported to an observer as a [`Status`] before the loop moves on.
//!
//! Iteration budget: the first attempt always runs; `iteration_limit` bounds
//! the retries after it, so a run makes at most `iteration_limit + 1`
//! attempts.

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::core::outcome::GenerationOutcome;
use crate::core::status::Status;

/// Iteration budget used when the caller has no preference.
pub const DEFAULT_ITERATION_LIMIT: u32 = 5;

/// Produces candidate code for a specification.
pub trait CodeClient {
    fn send(&self, specification: &str) -> Result<String>;
}

/// Runs candidate code against the specification it was built for.
///
/// Returns `Ok("")` if and only if the code passes. Any other text is
/// free-form diagnostics. `Err` is reserved for the runner itself breaking
/// (it could not execute at all) and aborts the run.
pub trait TestRunner {
    fn run(&self, code: &str) -> Result<String>;
}

/// Fatal errors that abort a run without producing an outcome.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("iteration limit must be at least 1")]
    InvalidIterationLimit,

    #[error("code generation failed on iteration {iteration}")]
    Generation {
        iteration: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("test runner failed on iteration {iteration}")]
    Verification {
        iteration: u32,
        #[source]
        source: anyhow::Error,
    },
}

impl GeneratorError {
    /// Iteration whose capability call failed, if any.
    pub fn iteration(&self) -> Option<u32> {
        match self {
            GeneratorError::InvalidIterationLimit => None,
            GeneratorError::Generation { iteration, .. }
            | GeneratorError::Verification { iteration, .. } => Some(*iteration),
        }
    }
}

/// One completed generate + verify cycle.
struct Attempt {
    code: String,
    output: String,
}

impl Attempt {
    fn passed(&self) -> bool {
        self.output.is_empty()
    }

    fn status(&self, iteration: u32) -> Status {
        Status::derive(
            iteration,
            Some(self.output.clone()),
            Some(self.code.clone()),
        )
    }
}

/// Orchestrates the generation loop over borrowed capabilities.
///
/// Holds no per-run state: each `generate_code` call starts again at
/// iteration 1.
pub struct Generator<'a, C: ?Sized, R: ?Sized> {
    client: &'a C,
    runner: &'a R,
}

impl<'a, C: CodeClient + ?Sized, R: TestRunner + ?Sized> Generator<'a, C, R> {
    pub fn new(client: &'a C, runner: &'a R) -> Self {
        Self { client, runner }
    }

    /// Generate code for `specification` until it verifies or the budget runs out.
    ///
    /// `on_status` is called synchronously with `loading` first and then once
    /// per completed cycle, strictly in order. Exhausting the budget is not an
    /// error: the outcome simply reports `complies_specification = false`.
    #[instrument(skip_all, fields(iteration_limit = iteration_limit, spec_bytes = specification.len()))]
    pub fn generate_code<F: FnMut(Status)>(
        &self,
        specification: &str,
        iteration_limit: u32,
        mut on_status: F,
    ) -> Result<GenerationOutcome, GeneratorError> {
        if iteration_limit == 0 {
            return Err(GeneratorError::InvalidIterationLimit);
        }

        on_status(Status::loading());

        let mut iteration = 1u32;
        let mut attempt = self.attempt(specification, iteration)?;
        loop {
            let passed = attempt.passed();
            on_status(attempt.status(iteration));
            if passed {
                info!(iteration, "generated code verified");
                break;
            }
            if iteration > iteration_limit {
                warn!(iteration, iteration_limit, "iteration budget exhausted");
                break;
            }
            attempt = self.attempt(specification, iteration + 1)?;
            iteration += 1;
        }

        Ok(GenerationOutcome::new(
            attempt.code,
            specification,
            &attempt.output,
            iteration,
        ))
    }

    fn attempt(&self, specification: &str, iteration: u32) -> Result<Attempt, GeneratorError> {
        debug!(iteration, "requesting code");
        let code = self
            .client
            .send(specification)
            .map_err(|source| GeneratorError::Generation { iteration, source })?;

        debug!(iteration, code_bytes = code.len(), "running tests");
        let output = self
            .runner
            .run(&code)
            .map_err(|source| GeneratorError::Verification { iteration, source })?;

        debug!(iteration, output_bytes = output.len(), "tests finished");
        Ok(Attempt { code, output })
    }
}
