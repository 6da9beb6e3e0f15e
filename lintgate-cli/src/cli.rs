use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use lintgate::matrix::Event;
use lintgate::setup::SetupPlan;
use lintgate::{
    PipelineConfig, PipelineReport, ProcessRunner, check_threshold, find_files, output,
    run_pipeline,
};

use crate::logging;

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lintgate.yaml";

#[derive(Parser, Debug)]
#[command(
    name = "lintgate",
    version,
    about = "Run doctest, format, type, lint and docstring checks over Python sources"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Pipeline config (YAML). Defaults to ./lintgate.yaml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every target file under the roots
    Run {
        /// Toolchain profile, e.g. 3.6.7, 3.8 or 3.x
        #[arg(long)]
        profile: String,
        /// Directory (or file) to scan; repeatable
        #[arg(long = "root")]
        roots: Vec<PathBuf>,
        /// Exclude glob; repeatable
        #[arg(long)]
        exclude: Vec<String>,
        /// Minimum lint score (default 9.5)
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// List the files a run would check
    Files {
        #[arg(long = "root")]
        roots: Vec<PathBuf>,
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Print the job matrix, or whether an event triggers it
    Matrix {
        #[arg(long, value_enum, requires = "reference")]
        event: Option<EventKind>,
        /// Branch (push, pull-request) or cron expression (schedule)
        #[arg(long = "ref")]
        reference: Option<String>,
    },
    /// Print the dependency plan for a profile
    Setup {
        #[arg(long)]
        profile: String,
        /// Requirement manifest, in install order; repeatable
        #[arg(long = "requirements")]
        requirements: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EventKind {
    Push,
    PullRequest,
    Schedule,
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::load(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            tracing::debug!("using {DEFAULT_CONFIG_FILE} from working directory");
            Ok(PipelineConfig::load(Path::new(DEFAULT_CONFIG_FILE))?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn apply_discovery_overrides(
    config: &mut PipelineConfig,
    roots: Vec<PathBuf>,
    exclude: Vec<String>,
) {
    if !roots.is_empty() {
        config.discovery.roots = roots;
    }
    config.discovery.exclude.extend(exclude);
}

/// Parse arguments, run the command and return the process exit code.
///
/// # Errors
///
/// Returns an error for setup failures: unreadable or invalid config, unknown
/// profile, unreadable manifests.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let mut config = load_config(cli.config.as_deref())?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Run {
            profile,
            roots,
            exclude,
            threshold,
            format,
        } => {
            apply_discovery_overrides(&mut config, roots, exclude);
            if let Some(threshold) = threshold {
                config.lint_threshold = check_threshold(threshold)?;
            }

            let report = match format {
                OutputFormat::Human => {
                    let report = run_pipeline(&config, &profile, ProcessRunner, &mut stdout)?;
                    output::write_human(&report, &mut stdout)?;
                    print_banner(&report, &mut stdout)?;
                    report
                }
                OutputFormat::Json => {
                    // Keep stdout clean for the JSON document.
                    let mut stderr = io::stderr().lock();
                    let report = run_pipeline(&config, &profile, ProcessRunner, &mut stderr)?;
                    output::write_json(&report, &mut stdout)?;
                    report
                }
            };
            Ok(report.exit_code())
        }
        Commands::Files { roots, exclude } => {
            apply_discovery_overrides(&mut config, roots, exclude);
            let (files, errors) = find_files(&config.discovery);
            for file in &files {
                writeln!(stdout, "{}", file.display())?;
            }
            for err in &errors {
                eprintln!("{}", err.format_human_readable());
            }
            Ok(i32::from(!errors.is_empty()))
        }
        Commands::Matrix { event, reference } => {
            if let (Some(kind), Some(reference)) = (event, reference) {
                let event = match kind {
                    EventKind::Push => Event::Push { branch: reference },
                    EventKind::PullRequest => Event::PullRequest { base: reference },
                    EventKind::Schedule => Event::Schedule { cron: reference },
                };
                let triggered = config.matrix.should_run(&event);
                writeln!(stdout, "{}", if triggered { "triggered" } else { "skipped" })?;
                return Ok(i32::from(!triggered));
            }
            let jobs = config.matrix.expand();
            writeln!(stdout, "{}", serde_json::to_string_pretty(&jobs)?)?;
            Ok(0)
        }
        Commands::Setup {
            profile,
            requirements,
            format,
        } => {
            let profile = config.profiles.resolve(&profile)?;
            let manifests = requirements
                .iter()
                .map(|path| {
                    fs::read_to_string(path)
                        .with_context(|| format!("Failed to read manifest {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;
            let manifests: Vec<&str> = manifests.iter().map(String::as_str).collect();
            let plan = SetupPlan::for_profile(profile, &manifests, &config.companion);

            match format {
                OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string_pretty(&plan)?)?,
                OutputFormat::Human => {
                    for req in &plan.requirements {
                        writeln!(stdout, "{}", req.spec)?;
                    }
                    writeln!(stdout, "{}", plan.companion)?;
                    for req in &plan.dropped {
                        tracing::info!(
                            profile = %plan.profile,
                            "dropped pinned requirement {}",
                            req.spec
                        );
                    }
                }
            }
            Ok(0)
        }
    }
}

fn print_banner(report: &PipelineReport, out: &mut dyn Write) -> Result<()> {
    if report.ok {
        writeln!(out, "{}", "PASS".green().bold())?;
    } else {
        writeln!(out, "{}", "FAIL".red().bold())?;
    }
    Ok(())
}
