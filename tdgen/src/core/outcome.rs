//! Terminal value of a generation run.

use serde::{Deserialize, Serialize};

/// Summary of a finished `generate_code` call.
///
/// Built once, from the last completed cycle, whether the loop stopped on
/// success or on budget exhaustion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub generated_code: String,
    pub specification: String,
    /// Whether the last attempt's verification output was empty.
    pub complies_specification: bool,
    /// Iteration number of the last completed cycle (1-indexed).
    pub iterations: u32,
}

impl GenerationOutcome {
    pub fn new(
        generated_code: impl Into<String>,
        specification: impl Into<String>,
        last_output: &str,
        iterations: u32,
    ) -> Self {
        Self {
            generated_code: generated_code.into(),
            specification: specification.into(),
            complies_specification: last_output.is_empty(),
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_last_output_complies() {
        let outcome = GenerationOutcome::new("code", "spec", "", 1);
        assert!(outcome.complies_specification);
    }

    #[test]
    fn diagnostics_in_last_output_do_not_comply() {
        let outcome = GenerationOutcome::new("code", "spec", "test failed", 6);
        assert!(!outcome.complies_specification);
        assert_eq!(outcome.iterations, 6);
        assert_eq!(outcome.specification, "spec");
    }
}
