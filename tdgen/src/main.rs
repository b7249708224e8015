use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;

use tdgen::exit_codes;
use tdgen::io::config::{DEFAULT_CONFIG_FILE, GeneratorConfig, load_config, write_config};
use tdgen::logging;
use tdgen::run::{RunOptions, run_generation, status_line, write_code};

#[derive(Parser)]
#[command(
    name = "tdgen",
    version,
    about = "Generate code from a test specification until the tests pass"
)]
struct Cli {
    /// Enable debug logging for tdgen (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
    /// Generate code for a specification, retrying until its tests pass.
    Run {
        /// File holding the specification (usually a test case).
        spec: PathBuf,

        /// Retries allowed after the first attempt (overrides the config).
        #[arg(short = 'n', long)]
        iteration_limit: Option<u32>,

        /// Write the final code here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Record every iteration under this directory (overrides the config).
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Run {
            spec,
            iteration_limit,
            output,
            log_dir,
        } => cmd_run(
            &cli.config,
            &spec,
            RunOptions {
                iteration_limit,
                log_dir,
            },
            output.as_deref(),
        ),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &GeneratorConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_run(
    config_path: &Path,
    spec_path: &Path,
    opts: RunOptions,
    output: Option<&Path>,
) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let specification = fs::read_to_string(spec_path)
        .with_context(|| format!("read specification {}", spec_path.display()))?;
    let root = std::env::current_dir().context("resolve working directory")?;
    debug!(root = %root.display(), spec = %spec_path.display(), "starting generation");

    let outcome = run_generation(&root, &cfg, &opts, &specification, |status| {
        println!("{}", status_line(status));
    })?;

    match output {
        Some(path) => write_code(path, &outcome.generated_code)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", outcome.generated_code).context("write code to stdout")?;
        }
    }

    if outcome.complies_specification {
        Ok(exit_codes::OK)
    } else {
        eprintln!(
            "generated code still fails its tests after {} iterations",
            outcome.iterations
        );
        Ok(exit_codes::NONCOMPLIANT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["tdgen", "init"]);
        assert!(matches!(cli.command, Command::Init { force: false }));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["tdgen", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn parse_run_with_overrides() {
        let cli = Cli::parse_from([
            "tdgen",
            "-v",
            "--config",
            "custom.toml",
            "run",
            "adder_test.txt",
            "-n",
            "3",
            "-o",
            "out.rs",
            "--log-dir",
            "logs",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        match cli.command {
            Command::Run {
                spec,
                iteration_limit,
                output,
                log_dir,
            } => {
                assert_eq!(spec, PathBuf::from("adder_test.txt"));
                assert_eq!(iteration_limit, Some(3));
                assert_eq!(output, Some(PathBuf::from("out.rs")));
                assert_eq!(log_dir, Some(PathBuf::from("logs")));
            }
            Command::Init { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn parse_run_defaults() {
        let cli = Cli::parse_from(["tdgen", "run", "spec.txt"]);
        match cli.command {
            Command::Run {
                iteration_limit,
                output,
                log_dir,
                ..
            } => {
                assert_eq!(iteration_limit, None);
                assert_eq!(output, None);
                assert_eq!(log_dir, None);
            }
            Command::Init { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn run_requires_spec() {
        assert!(Cli::try_parse_from(["tdgen", "run"]).is_err());
    }
}
