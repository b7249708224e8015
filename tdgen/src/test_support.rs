//! Test-only capability doubles and config fixtures.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::generator::{CodeClient, TestRunner};
use crate::io::config::{DEFAULT_CONFIG_FILE, GeneratorConfig, write_config};

/// A specification resembling what a user would feed the generator.
pub fn any_specification() -> String {
    r#"func test_adder() {
    let sut = Adder(1, 2)
    assert(sut.result == 3)
}"#
    .to_string()
}

/// Client that returns the same code on every call.
pub struct FixedClient {
    code: String,
    calls: Cell<u32>,
}

impl FixedClient {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl CodeClient for FixedClient {
    fn send(&self, _specification: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.code.clone())
    }
}

/// Client that replays a queue of replies; `Err` entries become errors.
///
/// Running out of replies is an error too, so a test that over-calls fails loudly.
pub struct ScriptedClient {
    replies: RefCell<VecDeque<Result<String, &'static str>>>,
    calls: Cell<u32>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, &'static str>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: Cell::new(0),
        }
    }

    /// Script that only ever succeeds, one code per call.
    pub fn codes<const N: usize>(codes: [&str; N]) -> Self {
        Self::new(codes.iter().map(|code| Ok(code.to_string())).collect())
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl CodeClient for ScriptedClient {
    fn send(&self, _specification: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        match self.replies.borrow_mut().pop_front() {
            Some(Ok(code)) => Ok(code),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted client exhausted")),
        }
    }
}

/// Runner that fails with fixed diagnostics until a chosen call, then passes
/// on that call and every later one.
pub struct StubRunner {
    succeeding_on: Option<u32>,
    failure_output: String,
    calls: Cell<u32>,
}

impl StubRunner {
    /// Pass from the `call`-th run (1-indexed) onward, fail with `"failure"` before it.
    pub fn succeeding_on(call: u32) -> Self {
        Self {
            succeeding_on: Some(call),
            failure_output: "failure".to_string(),
            calls: Cell::new(0),
        }
    }

    pub fn always_passing() -> Self {
        Self::succeeding_on(1)
    }

    pub fn always_failing(output: impl Into<String>) -> Self {
        Self {
            succeeding_on: None,
            failure_output: output.into(),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl TestRunner for StubRunner {
    fn run(&self, _code: &str) -> Result<String> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        let passes = match self.succeeding_on {
            Some(target) => call >= target,
            None => false,
        };
        if passes {
            Ok(String::new())
        } else {
            Ok(self.failure_output.clone())
        }
    }
}

/// `sh -c <script>` argv.
pub fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// Config whose generation and verification steps are shell scripts.
///
/// Candidates land in `candidate.txt`; both steps get a 10s timeout.
pub fn shell_config(generate: &str, verify: &str) -> GeneratorConfig {
    let mut cfg = GeneratorConfig::default();
    cfg.generation.command = sh(generate);
    cfg.generation.timeout_secs = 10;
    cfg.verification.command = sh(verify);
    cfg.verification.code_path = "candidate.txt".to_string();
    cfg.verification.timeout_secs = 10;
    cfg
}

/// Write `cfg` as `tdgen.toml` in `dir` and return its path.
pub fn write_shell_config(dir: &Path, cfg: &GeneratorConfig) -> PathBuf {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    write_config(&path, cfg).expect("write config");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_runner_keeps_passing_after_target_call() {
        let runner = StubRunner::succeeding_on(2);
        let outputs: Vec<String> = (0..4).map(|_| runner.run("code").expect("run")).collect();
        assert_eq!(outputs, vec!["failure", "", "", ""]);
        assert_eq!(runner.calls(), 4);
    }
}
