//! Scenario runner
//!
//! Usage:
//!   cargo run --release --bin econ_lab -- scenarios/classroom.toml --format csv

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use econ_lab::logging::{self, DEFAULT_FILTER};
use econ_lab::{execute, OutputFormat, RunConfig};

#[derive(Debug, Parser)]
#[command(name = "econ_lab", about = "Solve equilibrium scenarios from a TOML file")]
struct Args {
    /// Scenario file
    scenario: PathBuf,

    /// Overrides `[output] format`
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Overrides `[output] directory`
    #[arg(long)]
    output: Option<PathBuf>,

    /// Overrides `[run] threads` for sweeps
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_FILTER)]
    log_filter: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::initialize(&args.log_filter);

    let mut config = RunConfig::load(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))?;
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(directory) = args.output {
        config.output.directory = directory;
    }
    if args.threads.is_some() {
        config.run.threads = args.threads;
    }

    let summary = execute(&config).with_context(|| format!("running `{}`", config.run.name))?;

    println!(
        "{}: {} solved, {} failed, {} sweep points",
        config.run.name, summary.solved, summary.failed, summary.sweep_points
    );
    for path in &summary.written {
        println!("  {}", path.display());
    }
    Ok(())
}
