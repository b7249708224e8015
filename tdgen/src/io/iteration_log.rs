//! On-disk record of a generation run.
//!
//! Layout under the log directory:
//!
//! ```text
//! <dir>/1/status.json
//! <dir>/1/code.txt
//! <dir>/1/output.txt
//! <dir>/2/...
//! <dir>/outcome.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::core::outcome::GenerationOutcome;
use crate::core::status::{State, Status};

const OUTCOME_FILE: &str = "outcome.json";

#[derive(Debug, Clone)]
pub struct IterationPaths {
    pub dir: PathBuf,
    pub status_path: PathBuf,
    pub code_path: PathBuf,
    pub output_path: PathBuf,
}

impl IterationPaths {
    pub fn new(root: &Path, iteration: u32) -> Self {
        let dir = root.join(iteration.to_string());
        Self {
            dir: dir.clone(),
            status_path: dir.join("status.json"),
            code_path: dir.join("code.txt"),
            output_path: dir.join("output.txt"),
        }
    }
}

/// Writes one directory per completed iteration.
#[derive(Debug, Clone)]
pub struct IterationLog {
    dir: PathBuf,
}

impl IterationLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove entries left by an earlier run: numbered iteration directories
    /// and `outcome.json`. Anything else in the directory is left alone.
    pub fn reset(&self) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("read log dir {}", self.dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("read log dir {}", self.dir.display()))?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if path.is_dir() && name.parse::<u32>().is_ok() {
                fs::remove_dir_all(&path)
                    .with_context(|| format!("remove iteration dir {}", path.display()))?;
            } else if name == OUTCOME_FILE {
                fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            }
        }
        debug!(dir = %self.dir.display(), "cleared previous run");
        Ok(())
    }

    /// Record a status. `loading` markers carry nothing to persist and are skipped.
    pub fn record(&self, status: &Status) -> Result<Option<IterationPaths>> {
        if status.state() == State::Loading {
            return Ok(None);
        }
        let paths = IterationPaths::new(&self.dir, status.current_iteration());
        fs::create_dir_all(&paths.dir)
            .with_context(|| format!("create iteration dir {}", paths.dir.display()))?;

        write_json(&paths.status_path, status)?;
        if let Some(code) = status.generated_code() {
            write_text(&paths.code_path, code)?;
        }
        if let Some(output) = status.output() {
            write_text(&paths.output_path, output)?;
        }
        debug!(dir = %paths.dir.display(), "recorded iteration");
        Ok(Some(paths))
    }

    pub fn write_outcome(&self, outcome: &GenerationOutcome) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create log dir {}", self.dir.display()))?;
        let path = self.dir.join(OUTCOME_FILE);
        write_json(&path, outcome)?;
        Ok(path)
    }
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value)?;
    buf.push('\n');
    write_text(path, &buf)
}
