//! Per-iteration status snapshots reported by the generation loop.
//!
//! A [`Status`] is an immutable value: the loop builds a fresh one for every
//! observable transition and hands it to the observer by value. The [`State`]
//! is derived once, at construction, from the presence and emptiness of the
//! verification output.

use serde::{Deserialize, Serialize};

/// Classification of a single iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// No verification has completed yet for the current attempt.
    Loading,
    /// Verification output was empty.
    Success,
    /// Verification output was non-empty.
    Failure,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Loading => "loading",
            State::Success => "success",
            State::Failure => "failure",
        }
    }

    /// Derive the state from an optional verification output.
    pub fn from_output(output: Option<&str>) -> Self {
        match output {
            None => State::Loading,
            Some(text) if text.is_empty() => State::Success,
            Some(_) => State::Failure,
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of loop progress after one transition.
///
/// Equality is structural, so tests can compare whole observed sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    current_iteration: u32,
    state: State,
    output: Option<String>,
    generated_code: Option<String>,
}

impl Status {
    /// Build a status, deriving its state from `output`.
    pub fn derive(
        current_iteration: u32,
        output: Option<String>,
        generated_code: Option<String>,
    ) -> Self {
        let state = State::from_output(output.as_deref());
        Self {
            current_iteration,
            state,
            output,
            generated_code,
        }
    }

    /// The marker emitted before the first attempt.
    pub fn loading() -> Self {
        Self::derive(1, None, None)
    }

    pub fn success(current_iteration: u32, generated_code: impl Into<String>) -> Self {
        Self::derive(
            current_iteration,
            Some(String::new()),
            Some(generated_code.into()),
        )
    }

    /// `output` is expected to be non-empty; an empty one yields a success.
    pub fn failure(
        current_iteration: u32,
        output: impl Into<String>,
        generated_code: impl Into<String>,
    ) -> Self {
        Self::derive(
            current_iteration,
            Some(output.into()),
            Some(generated_code.into()),
        )
    }

    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn generated_code(&self) -> Option<&str> {
        self.generated_code.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.state == State::Success
    }

    pub fn is_failure(&self) -> bool {
        self.state == State::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_output_is_loading() {
        let status = Status::derive(3, None, Some("code".to_string()));
        assert_eq!(status.state(), State::Loading);
        assert_eq!(status.current_iteration(), 3);
    }

    #[test]
    fn empty_output_is_success() {
        let status = Status::derive(2, Some(String::new()), Some("code".to_string()));
        assert_eq!(status.state(), State::Success);
        assert!(status.is_success());
    }

    #[test]
    fn non_empty_output_is_failure() {
        let status = Status::derive(2, Some("assertion failed".to_string()), None);
        assert_eq!(status.state(), State::Failure);
        assert!(status.is_failure());
    }

    #[test]
    fn whitespace_output_is_still_failure() {
        let status = Status::derive(1, Some("\n".to_string()), None);
        assert_eq!(status.state(), State::Failure);
    }

    #[test]
    fn loading_starts_at_iteration_one() {
        let status = Status::loading();
        assert_eq!(status.current_iteration(), 1);
        assert_eq!(status.state(), State::Loading);
        assert_eq!(status.output(), None);
        assert_eq!(status.generated_code(), None);
    }

    #[test]
    fn constructors_agree_with_derive() {
        assert_eq!(
            Status::success(4, "fn add() {}"),
            Status::derive(4, Some(String::new()), Some("fn add() {}".to_string()))
        );
        assert_eq!(
            Status::failure(2, "boom", "fn add() {}"),
            Status::derive(2, Some("boom".to_string()), Some("fn add() {}".to_string()))
        );
    }

    #[test]
    fn derivation_is_repeatable() {
        let first = Status::derive(5, Some("boom".to_string()), Some("code".to_string()));
        let second = Status::derive(5, Some("boom".to_string()), Some("code".to_string()));
        assert_eq!(first, second);
    }

    #[test]
    fn equality_compares_every_field() {
        assert_ne!(Status::success(1, "a"), Status::success(1, "b"));
        assert_ne!(Status::success(1, "a"), Status::success(2, "a"));
        assert_ne!(Status::failure(1, "x", "a"), Status::failure(1, "y", "a"));
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_value(Status::failure(2, "boom", "code")).expect("serialize");
        assert_eq!(json["state"], "failure");
        assert_eq!(json["current_iteration"], 2);
        assert_eq!(json["output"], "boom");
    }
}
