//! JSON and CSV export of solve reports and sweeps

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use econ_core::WelfareMetrics;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::model::Model;
use crate::result::EquilibriumResult;
use crate::sweep::SweepPoint;

/// Successful solve of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub scenario: String,
    pub model: Model,
    pub result: EquilibriumResult,
    pub welfare: WelfareMetrics,
}

impl SolveReport {
    pub fn new(scenario: impl Into<String>, result: EquilibriumResult) -> Self {
        SolveReport {
            scenario: scenario.into(),
            model: result.model(),
            welfare: result.welfare(),
            result,
        }
    }
}

/// Scenario whose solve returned an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub scenario: String,
    pub model: Model,
    pub error_kind: String,
    pub message: String,
}

/// One swept value, flattened for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub value: f64,
    pub result: Option<EquilibriumResult>,
    pub welfare: Option<WelfareMetrics>,
    pub error: Option<String>,
}

impl From<&SweepPoint> for SweepRecord {
    fn from(point: &SweepPoint) -> Self {
        match &point.outcome {
            Ok(result) => SweepRecord {
                value: point.value,
                welfare: Some(result.welfare()),
                result: Some(result.clone()),
                error: None,
            },
            Err(e) => SweepRecord {
                value: point.value,
                result: None,
                welfare: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub scenario: String,
    pub parameter: String,
    pub points: Vec<SweepRecord>,
}

/// Everything one run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run: String,
    pub reports: Vec<SolveReport>,
    pub failures: Vec<FailureReport>,
    pub sweep: Option<SweepReport>,
}

fn welfare_fields(w: &WelfareMetrics) -> [(&'static str, f64); 6] {
    [
        ("consumer_surplus", w.consumer_surplus),
        ("producer_surplus", w.producer_surplus),
        ("total_surplus", w.total_surplus),
        ("efficient_surplus", w.efficient_surplus),
        ("deadweight_loss", w.deadweight_loss),
        ("efficiency_ratio", w.efficiency_ratio),
    ]
}

fn create_parent(path: &Path) -> Result<(), ConfigError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))
        }
        _ => Ok(()),
    }
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), ConfigError> {
    let path = path.as_ref();
    create_parent(path)?;
    let file = File::create(path).map_err(|e| ConfigError::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    scenario: &'a str,
    model: Model,
    output: &'a str,
    value: f64,
}

/// One row per (scenario, output), the welfare fields after the model outputs
pub fn write_reports_csv<P: AsRef<Path>>(path: P, reports: &[SolveReport]) -> Result<(), ConfigError> {
    let path = path.as_ref();
    create_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for report in reports {
        let outputs = report.result.outputs();
        let named = outputs
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .chain(welfare_fields(&report.welfare));
        for (output, value) in named {
            wtr.serialize(OutputRow {
                scenario: &report.scenario,
                model: report.model,
                output,
                value,
            })?;
        }
    }
    wtr.flush().map_err(|e| ConfigError::io(path, e))?;
    Ok(())
}

/// Wide table: swept value, every output seen across points, welfare, error
///
/// Outputs that a point does not report (e.g. an absent critical mass) are
/// left empty.
pub fn write_sweep_csv<P: AsRef<Path>>(path: P, parameter: &str, points: &[SweepPoint]) -> Result<(), ConfigError> {
    let path = path.as_ref();
    create_parent(path)?;

    let rows: Vec<Option<Vec<(String, f64)>>> = points
        .iter()
        .map(|p| {
            p.outcome.as_ref().ok().map(|result| {
                let mut named = result.outputs();
                named.extend(
                    welfare_fields(&result.welfare())
                        .iter()
                        .map(|(n, v)| (n.to_string(), *v)),
                );
                named
            })
        })
        .collect();

    let mut columns: Vec<String> = Vec::new();
    for named in rows.iter().flatten() {
        for (name, _) in named {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![parameter.to_string()];
    header.extend(columns.iter().cloned());
    header.push("error".to_string());
    wtr.write_record(&header)?;

    for (point, named) in points.iter().zip(&rows) {
        let mut record = vec![point.value.to_string()];
        for column in &columns {
            let cell = named
                .as_ref()
                .and_then(|n| n.iter().find(|(name, _)| name == column))
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            record.push(cell);
        }
        record.push(match &point.outcome {
            Ok(_) => String::new(),
            Err(e) => e.to_string(),
        });
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(|e| ConfigError::io(path, e))?;
    Ok(())
}
