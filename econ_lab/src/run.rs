//! Executes a scenario file end to end

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::{ConfigError, OutputFormat, RunConfig};
use crate::output::{
    write_json, write_reports_csv, write_sweep_csv, FailureReport, RunReport, SolveReport, SweepRecord,
    SweepReport,
};
use crate::solve::solve;
use crate::sweep::{SweepPoint, SweepRunner};

/// Counts and paths of what a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub solved: usize,
    pub failed: usize,
    pub sweep_points: usize,
    pub written: Vec<PathBuf>,
}

/// Solve every scenario without exporting anything
///
/// A scenario whose solve fails becomes a [`FailureReport`]; the remaining
/// scenarios still run.
pub fn solve_scenarios(config: &RunConfig) -> (Vec<SolveReport>, Vec<FailureReport>) {
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for scenario in &config.scenarios {
        match solve(scenario.model(), &scenario.params) {
            Ok(result) => {
                info!(scenario = %scenario.name, model = %scenario.model(), "solved");
                reports.push(SolveReport::new(&scenario.name, result));
            }
            Err(e) => {
                warn!(scenario = %scenario.name, model = %scenario.model(), error = %e, "solve failed");
                failures.push(FailureReport {
                    scenario: scenario.name.clone(),
                    model: scenario.model(),
                    error_kind: e.kind().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    (reports, failures)
}

/// Run the configured sweep, if any
pub fn run_sweep(config: &RunConfig) -> Result<Option<Vec<SweepPoint>>, ConfigError> {
    let Some(sweep) = &config.sweep else {
        return Ok(None);
    };
    let scenario = config
        .scenario(&sweep.scenario)
        .ok_or_else(|| ConfigError::UnknownScenario(sweep.scenario.clone()))?;

    let mut runner = SweepRunner::new(scenario.params.clone(), &sweep.parameter, sweep.values.clone());
    if let Some(threads) = config.run.threads {
        runner = runner.num_threads(threads);
    }
    let points = runner.run()?;
    let failed = points.iter().filter(|p| p.outcome.is_err()).count();
    info!(
        scenario = %sweep.scenario,
        parameter = %sweep.parameter,
        points = points.len(),
        failed,
        "sweep complete"
    );
    Ok(Some(points))
}

/// Solve, sweep, and write results under the configured output directory
pub fn execute(config: &RunConfig) -> Result<RunSummary, ConfigError> {
    let start = Instant::now();
    info!(run = %config.run.name, scenarios = config.scenarios.len(), "starting run");

    let (reports, failures) = solve_scenarios(config);
    let points = run_sweep(config)?;

    let dir = &config.output.directory;
    let name = &config.run.name;
    let mut written = Vec::new();

    match config.output.format {
        OutputFormat::Json => {
            let sweep = match (&config.sweep, &points) {
                (Some(sweep), Some(points)) => Some(SweepReport {
                    scenario: sweep.scenario.clone(),
                    parameter: sweep.parameter.clone(),
                    points: points.iter().map(SweepRecord::from).collect(),
                }),
                _ => None,
            };
            let report = RunReport {
                run: name.clone(),
                reports: reports.clone(),
                failures: failures.clone(),
                sweep,
            };
            let path = dir.join(format!("{}.json", name));
            write_json(&path, &report)?;
            written.push(path);
        }
        OutputFormat::Csv => {
            let path = dir.join(format!("{}.csv", name));
            write_reports_csv(&path, &reports)?;
            written.push(path);
            if let (Some(sweep), Some(points)) = (&config.sweep, &points) {
                let path = dir.join(format!("{}_sweep.csv", name));
                write_sweep_csv(&path, &sweep.parameter, points)?;
                written.push(path);
            }
            if !failures.is_empty() {
                let path = dir.join(format!("{}_failures.json", name));
                write_json(&path, &failures)?;
                written.push(path);
            }
        }
    }

    for path in &written {
        info!(path = %path.display(), "wrote results");
    }
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "run complete");

    Ok(RunSummary {
        solved: reports.len(),
        failed: failures.len(),
        sweep_points: points.map_or(0, |p| p.len()),
        written,
    })
}
