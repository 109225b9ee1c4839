#![warn(missing_docs)]
//! Pipebench CLI Library
//!
//! This module provides the run orchestration and the CLI for benchmark
//! binaries. Use `pipebench::run()` (or `pipebench_cli::run()`) in your main
//! function to discover every registered benchmark, run it and hand the
//! aggregate pipeline to the configured orchestrator.
//!
//! # Example
//!
//! ```ignore
//! use pipebench::prelude::*;
//!
//! #[benchmark]
//! fn titanic_benchmark(b: &mut Benchmark) -> anyhow::Result<()> {
//!     b.evaluate_pipeline(&build_pipeline()?)?;
//!     Ok(())
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     pipebench_cli::run()
//! }
//! ```

mod config;
pub mod orchestrator;
mod planner;
mod report;
pub mod runner;

pub use config::*;
pub use orchestrator::{
    ClusterOrchestrator, ComponentExecutor, LocalOrchestrator, LoggingExecutor, Orchestrator,
    execution_order, orchestrator_for,
};
pub use planner::{ExecutionPlan, NameFilter, build_plan, expand_replicas};
pub use report::{build_report, build_report_meta};
pub use runner::{RunOptions, RunSummary};

use anyhow::Context;
use clap::{Parser, Subcommand};
use pipebench_core::{BenchmarkDef, ROOT_BENCHMARK, registry};
use pipebench_report::{OutputFormat, format_human_report, generate_json_report};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pipebench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "pipebench")]
#[command(author, version, about = "Pipebench - benchmark orchestration for ML pipelines")]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Keep pipelines whose name matches this regex (anchored at the start)
    #[arg(default_value = "")]
    pub filter: String,

    /// Runtime config: inline JSON or a path to a .json/.toml file
    /// Defaults to a discovered pipebench.toml, else local execution
    #[arg(long)]
    pub config: Option<String>,

    /// Replicas per benchmark, unless the config sets pipeline_args.runs_per_benchmark
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    pub runs_per_benchmark: i64,

    /// Output format: json, human
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dry run - list benchmarks without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Skip benchmarks with this tag
    #[arg(long)]
    pub skip_tag: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all discovered benchmarks
    List,
    /// Run benchmarks (default)
    Run,
    /// Write a default pipebench.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the Pipebench CLI with the process arguments.
/// This is the main entry point for benchmark binaries.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if configuration, a benchmark
/// or the orchestrator failed.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Pipebench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    let filter = if cli.verbose {
        "pipebench=debug"
    } else {
        "pipebench=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    match cli.command {
        Some(Commands::List) => list_benchmarks(&cli),
        Some(Commands::Run) => run_benchmarks(&cli),
        Some(Commands::Init { force }) => init_config(force),
        None => {
            // Default: run benchmarks
            if cli.dry_run {
                list_benchmarks(&cli)
            } else {
                run_benchmarks(&cli)
            }
        }
    }
}

/// Resolve the runtime config: `--config`, then a file discovered from `cwd`,
/// then local. A discovered file that fails to load is an error.
fn resolve_config(cli: &Cli, cwd: &Path) -> anyhow::Result<RuntimeConfig> {
    if let Some(arg) = &cli.config {
        return Ok(RuntimeConfig::from_arg(arg)?);
    }
    Ok(RuntimeConfig::discover_from(cwd)?.unwrap_or_else(RuntimeConfig::local))
}

fn run_options(cli: &Cli, config: RuntimeConfig) -> RunOptions {
    RunOptions {
        config,
        default_runs_per_benchmark: cli.runs_per_benchmark,
        filter: cli.filter.clone(),
        tag: cli.tag.clone(),
        skip_tag: cli.skip_tag.clone(),
    }
}

fn run_benchmarks(cli: &Cli) -> anyhow::Result<()> {
    let format: OutputFormat = cli
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    let options = run_options(cli, resolve_config(cli, &cwd)?);

    // Validate up front to pick the orchestrator; the runner validates again
    let validated = options.validate()?;
    let orchestrator = orchestrator_for(&validated);

    let instances = {
        let registry = registry::global();
        registry.validate()?;
        registry.concrete_instances(ROOT_BENCHMARK)
    };
    if instances.is_empty() {
        println!("No benchmarks found.");
        return Ok(());
    }

    let summary = runner::run(instances, &options, orchestrator.as_ref())?;
    let report = build_report(&summary, &cli.filter);

    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_report(&report),
    };

    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn list_benchmarks(cli: &Cli) -> anyhow::Result<()> {
    println!("Pipebench Plan:");

    let registry = registry::global();
    registry.validate()?;

    let plan = build_plan(
        registry.concrete_instances(ROOT_BENCHMARK),
        cli.tag.as_deref(),
        cli.skip_tag.as_deref(),
    );

    let mut families: std::collections::BTreeMap<&str, Vec<&BenchmarkDef>> =
        std::collections::BTreeMap::new();
    for instance in &plan.instances {
        let def = instance.def();
        families.entry(def.parent_name()).or_default().push(def);
    }

    let mut total = 0;
    for (family, defs) in &families {
        println!("├── {}", family);
        for def in defs {
            let tags = if def.tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", def.tags.join(", "))
            };
            println!(
                "│   ├── {}{} ({}:{})",
                def.base_name(),
                tags,
                def.file,
                def.line
            );
            total += 1;
        }
    }

    println!("{} benchmarks found.", total);

    let abstract_count = registry.iter().filter(|d| d.is_abstract()).count();
    if abstract_count > 0 {
        println!("{} abstract definitions.", abstract_count);
    }

    // Show all available tags across the entire suite
    let mut tag_counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for def in registry.iter() {
        for tag in def.tags {
            *tag_counts.entry(*tag).or_default() += 1;
        }
    }
    if !tag_counts.is_empty() {
        let tags_display: Vec<String> = tag_counts
            .iter()
            .map(|(tag, count)| format!("{} ({})", tag, count))
            .collect();
        println!("Tags: {}", tags_display.join(", "));
    }

    Ok(())
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    std::fs::write(&path, RuntimeConfig::default_toml())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
