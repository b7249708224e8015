//! Generator configuration stored in `tdgen.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::generator::DEFAULT_ITERATION_LIMIT;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tdgen.toml";

/// Generator configuration (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Retries allowed after the first attempt.
    pub iteration_limit: u32,

    /// Directory for per-iteration status logs. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    pub generation: GenerationConfig,

    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Command that reads a prompt on stdin and prints code on stdout.
    pub command: Vec<String>,

    /// minijinja template for the prompt; `specification` is in scope.
    pub prompt_template: String,

    pub timeout_secs: u64,

    /// Stdout beyond this many bytes is discarded.
    pub output_limit_bytes: usize,

    /// Keep only the first fenced code block of the reply, when one exists.
    pub extract_code_block: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "codex".to_string(),
                "exec".to_string(),
                "--skip-git-repo-check".to_string(),
                "-".to_string(),
            ],
            prompt_template: "{{ specification }}".to_string(),
            timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
            extract_code_block: true,
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerificationConfig {
    /// Test command; exit status 0 means the candidate passes.
    pub command: Vec<String>,

    /// Where the candidate code is written, relative to the working directory.
    pub code_path: String,

    pub timeout_secs: u64,

    /// Diagnostics beyond this many bytes per stream are discarded.
    pub output_limit_bytes: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "cargo".to_string(),
                "test".to_string(),
                "--quiet".to_string(),
            ],
            code_path: "src/lib.rs".to_string(),
            timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl VerificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            log_dir: None,
            generation: GenerationConfig::default(),
            verification: VerificationConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iteration_limit == 0 {
            return Err(anyhow!("iteration_limit must be > 0"));
        }
        validate_command("generation.command", &self.generation.command)?;
        if self.generation.timeout_secs == 0 {
            return Err(anyhow!("generation.timeout_secs must be > 0"));
        }
        if self.generation.output_limit_bytes == 0 {
            return Err(anyhow!("generation.output_limit_bytes must be > 0"));
        }
        validate_command("verification.command", &self.verification.command)?;
        if self.verification.code_path.trim().is_empty() {
            return Err(anyhow!("verification.code_path must not be empty"));
        }
        if self.verification.timeout_secs == 0 {
            return Err(anyhow!("verification.timeout_secs must be > 0"));
        }
        if self.verification.output_limit_bytes == 0 {
            return Err(anyhow!("verification.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

fn validate_command(field: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(anyhow!("{field} must be a non-empty array")),
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GeneratorConfig::default()`.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    if !path.exists() {
        let cfg = GeneratorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GeneratorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &GeneratorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, GeneratorConfig::default());
        assert_eq!(cfg.iteration_limit, DEFAULT_ITERATION_LIMIT);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested/tdgen.toml");
        let cfg = GeneratorConfig {
            iteration_limit: 2,
            log_dir: Some(".tdgen/iterations".to_string()),
            ..GeneratorConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tdgen.toml");
        fs::write(
            &path,
            "iteration_limit = 3\n\n[verification]\ncommand = [\"swift\", \"test\"]\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.iteration_limit, 3);
        assert_eq!(cfg.verification.command, vec!["swift", "test"]);
        assert_eq!(cfg.verification.code_path, "src/lib.rs");
        assert_eq!(cfg.generation, GenerationConfig::default());
    }

    #[test]
    fn rejects_zero_iteration_limit() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tdgen.toml");
        fs::write(&path, "iteration_limit = 0\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("iteration_limit must be > 0"));
    }

    #[test]
    fn rejects_blank_commands() {
        let mut cfg = GeneratorConfig::default();
        cfg.generation.command = vec![" ".to_string()];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("generation.command"));

        let mut cfg = GeneratorConfig::default();
        cfg.verification.command.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("verification.command"));
    }

    #[test]
    fn rejects_zero_timeouts_and_limits() {
        let mut cfg = GeneratorConfig::default();
        cfg.verification.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = GeneratorConfig::default();
        cfg.generation.output_limit_bytes = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = GeneratorConfig::default();
        cfg.verification.code_path = String::new();
        assert!(cfg.validate().is_err());
    }
}
