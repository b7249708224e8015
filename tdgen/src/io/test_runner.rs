//! Verification through an external test command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::generator::TestRunner;
use crate::io::config::VerificationConfig;
use crate::io::process::{command_from_argv, run_command_with_timeout};

/// [`TestRunner`] that writes the candidate to disk and runs `verification.command`.
///
/// Exit status 0 yields empty output. Any other ending (non-zero exit,
/// timeout) yields non-empty diagnostics. Only failures to write the
/// candidate or to start the command are errors.
pub struct CommandTestRunner {
    config: VerificationConfig,
    workdir: PathBuf,
}

impl CommandTestRunner {
    pub fn new(config: VerificationConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            workdir: workdir.into(),
        }
    }

    /// Absolute location the candidate code is written to.
    pub fn code_path(&self) -> PathBuf {
        self.workdir.join(&self.config.code_path)
    }
}

impl TestRunner for CommandTestRunner {
    #[instrument(skip_all, fields(timeout_secs = self.config.timeout_secs))]
    fn run(&self, code: &str) -> Result<String> {
        let code_path = self.code_path();
        write_candidate(&code_path, code)?;

        let mut cmd = command_from_argv(&self.config.command)?;
        cmd.current_dir(&self.workdir);
        info!(program = %self.config.command[0], code_path = %code_path.display(), "running tests");

        let output = run_command_with_timeout(
            cmd,
            None,
            self.config.timeout(),
            self.config.output_limit_bytes,
        )
        .context("run test command")?;

        if output.timed_out {
            warn!(timeout_secs = self.config.timeout_secs, "test command timed out");
            let mut diagnostics = output.combined_lossy();
            diagnostics.push_str(&format!(
                "\n[test command timed out after {:?}]\n",
                self.config.timeout()
            ));
            return Ok(diagnostics);
        }
        if output.status.success() {
            debug!("tests passed");
            return Ok(String::new());
        }

        debug!(exit_code = ?output.status.code(), "tests failed");
        let diagnostics = output.combined_lossy();
        if diagnostics.trim().is_empty() {
            // Blank output must never read as a pass.
            return Ok(format!(
                "test command failed with status {:?} and no output\n",
                output.status.code()
            ));
        }
        Ok(diagnostics)
    }
}

fn write_candidate(path: &Path, code: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create candidate dir {}", parent.display()))?;
    }
    fs::write(path, code).with_context(|| format!("write candidate {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sh;

    fn runner(workdir: &Path, command: Vec<String>) -> CommandTestRunner {
        let config = VerificationConfig {
            command,
            code_path: "src/candidate.txt".to_string(),
            timeout_secs: 10,
            output_limit_bytes: 10_000,
        };
        CommandTestRunner::new(config, workdir)
    }

    #[test]
    fn passing_command_yields_empty_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sut = runner(temp.path(), sh("echo 'all 3 tests passed'"));

        let output = sut.run("fn add() {}").expect("run");
        assert_eq!(output, "");
    }

    #[test]
    fn writes_candidate_before_running() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sut = runner(temp.path(), sh("grep -q 'struct Adder' src/candidate.txt"));

        assert_eq!(sut.run("struct Adder {}").expect("run"), "");
        let written = fs::read_to_string(temp.path().join("src/candidate.txt")).expect("read");
        assert_eq!(written, "struct Adder {}");
    }

    #[test]
    fn failing_command_returns_diagnostics() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sut = runner(
            temp.path(),
            sh("echo 'test_adder ... FAILED'; echo 'expected 3, got 4' >&2; exit 101"),
        );

        let output = sut.run("broken").expect("run");
        assert!(output.contains("test_adder ... FAILED"));
        assert!(output.contains("expected 3, got 4"));
    }

    #[test]
    fn silent_failure_still_reports_diagnostics() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sut = runner(temp.path(), sh("exit 1"));

        let output = sut.run("broken").expect("run");
        assert!(!output.is_empty());
        assert!(output.contains("Some(1)"));
    }

    #[test]
    fn timeout_is_a_failure_not_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut sut = runner(temp.path(), sh("exec sleep 5"));
        sut.config.timeout_secs = 1;

        let output = sut.run("loop {}").expect("timeout yields diagnostics");
        assert!(output.contains("timed out"));
    }

    #[test]
    fn timeout_stops_test_processes_spawned_by_the_command() {
        let temp = tempfile::tempdir().expect("tempdir");
        // `sh` forks `sleep`, which inherits the output pipes.
        let mut sut = runner(temp.path(), sh("echo running; sleep 30; true"));
        sut.config.timeout_secs = 1;

        let started = std::time::Instant::now();
        let output = sut.run("loop {}").expect("timeout yields diagnostics");

        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert!(output.contains("running"));
        assert!(output.contains("timed out"));
    }

    #[test]
    fn missing_program_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sut = runner(temp.path(), vec!["tdgen-no-such-test-tool".to_string()]);
        assert!(sut.run("code").is_err());
    }
}
