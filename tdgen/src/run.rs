//! Orchestration for `tdgen run`.
//!
//! Wires the process-backed capabilities from [`crate::io`] into a
//! [`Generator`], mirrors every status into the optional iteration log, and
//! writes the final code.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::core::outcome::GenerationOutcome;
use crate::core::status::Status;
use crate::generator::Generator;
use crate::io::client::CommandClient;
use crate::io::config::GeneratorConfig;
use crate::io::iteration_log::IterationLog;
use crate::io::test_runner::CommandTestRunner;

/// Per-invocation overrides layered over [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub iteration_limit: Option<u32>,
    pub log_dir: Option<PathBuf>,
}

impl RunOptions {
    pub fn iteration_limit(&self, cfg: &GeneratorConfig) -> u32 {
        self.iteration_limit.unwrap_or(cfg.iteration_limit)
    }

    /// CLI flag wins over the config; config paths are relative to `root`.
    pub fn log_dir(&self, root: &Path, cfg: &GeneratorConfig) -> Option<PathBuf> {
        self.log_dir
            .clone()
            .or_else(|| cfg.log_dir.as_ref().map(|dir| root.join(dir)))
    }
}

/// Run the generation loop for `specification` with commands executed in `root`.
///
/// `on_status` sees every status after it has been logged. The log directory
/// is cleared of any earlier run first. Iteration log errors are reported as
/// warnings and never stop the loop.
pub fn run_generation<F: FnMut(&Status)>(
    root: &Path,
    cfg: &GeneratorConfig,
    opts: &RunOptions,
    specification: &str,
    mut on_status: F,
) -> Result<GenerationOutcome> {
    let client = CommandClient::new(cfg.generation.clone(), root);
    let runner = CommandTestRunner::new(cfg.verification.clone(), root);
    let generator = Generator::new(&client, &runner);
    let log = opts.log_dir(root, cfg).map(IterationLog::new);
    if let Some(log) = &log
        && let Err(err) = log.reset()
    {
        warn!(error = %format!("{err:#}"), "failed to clear iteration log");
    }

    let outcome = generator.generate_code(specification, opts.iteration_limit(cfg), |status| {
        if let Some(log) = &log
            && let Err(err) = log.record(&status)
        {
            warn!(error = %format!("{err:#}"), "failed to record iteration");
        }
        on_status(&status);
    })?;

    if let Some(log) = &log {
        match log.write_outcome(&outcome) {
            Ok(path) => info!(path = %path.display(), "wrote outcome"),
            Err(err) => warn!(error = %format!("{err:#}"), "failed to record outcome"),
        }
    }
    Ok(outcome)
}

/// Write generated code to `path`, creating parent directories.
pub fn write_code(path: &Path, code: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut buf = code.to_string();
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    fs::write(path, buf).with_context(|| format!("write {}", path.display()))
}

/// One status line, e.g. `iteration 2: failure`.
pub fn status_line(status: &Status) -> String {
    format!(
        "iteration {}: {}",
        status.current_iteration(),
        status.state()
    )
}
