//! Code generation through an external command.
//!
//! [`CommandClient`] renders the specification into a prompt, pipes it to a
//! configured command (an LLM CLI, a script, anything that prints code), and
//! returns what the command prints. Which model sits behind the command is
//! not this crate's concern.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use minijinja::{Environment, context};
use tracing::{debug, info, instrument, warn};

use crate::core::extract::extract_code_block;
use crate::generator::CodeClient;
use crate::io::config::GenerationConfig;
use crate::io::process::{command_from_argv, run_command_with_timeout};

/// [`CodeClient`] that spawns `generation.command` once per request.
pub struct CommandClient {
    config: GenerationConfig,
    workdir: PathBuf,
}

impl CommandClient {
    pub fn new(config: GenerationConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            workdir: workdir.into(),
        }
    }

    /// Render the prompt sent on stdin for `specification`.
    pub fn render_prompt(&self, specification: &str) -> Result<String> {
        let env = Environment::new();
        env.render_str(
            &self.config.prompt_template,
            context! { specification => specification },
        )
        .context("render generation prompt")
    }

    fn post_process(&self, stdout: &str) -> String {
        if self.config.extract_code_block {
            if let Some(block) = extract_code_block(stdout) {
                return trim_code(block);
            }
            debug!("no fenced code block in reply, using raw output");
        }
        trim_code(stdout)
    }
}

/// Drop surrounding blank lines and trailing whitespace, keeping the first
/// line's indentation.
fn trim_code(text: &str) -> String {
    let start = text
        .split('\n')
        .take_while(|line| line.trim().is_empty())
        .map(|line| line.len() + 1)
        .sum::<usize>()
        .min(text.len());
    text[start..].trim_end().to_string()
}

impl CodeClient for CommandClient {
    #[instrument(skip_all, fields(timeout_secs = self.config.timeout_secs))]
    fn send(&self, specification: &str) -> Result<String> {
        let prompt = self.render_prompt(specification)?;
        let mut cmd = command_from_argv(&self.config.command)?;
        cmd.current_dir(&self.workdir);
        info!(program = %self.config.command[0], "requesting code");

        let output = run_command_with_timeout(
            cmd,
            Some(prompt.as_bytes()),
            self.config.timeout(),
            self.config.output_limit_bytes,
        )
        .context("run generation command")?;

        if output.timed_out {
            warn!(
                timeout_secs = self.config.timeout_secs,
                "generation command timed out"
            );
            return Err(anyhow!(
                "generation command timed out after {:?}",
                self.config.timeout()
            ));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "generation command failed");
            return Err(anyhow!(
                "generation command failed with status {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let code = self.post_process(&output.stdout_lossy());
        debug!(code_bytes = code.len(), "generation command completed");
        Ok(code)
    }
}
