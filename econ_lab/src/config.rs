//! TOML scenario files
//!
//! A file names a run, lists one or more scenarios (each a tagged parameter
//! set), optionally sweeps one parameter of one scenario, and says where the
//! results go.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use econ_core::SolverError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Model, ParameterSet};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("scenario file defines no scenarios")]
    NoScenarios,

    #[error("scenario `{0}` is defined more than once")]
    DuplicateScenario(String),

    #[error("sweep refers to unknown scenario `{0}`")]
    UnknownScenario(String),

    #[error("sweep over `{0}` has no values")]
    EmptySweep(String),

    #[error("failed to build sweep thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSection {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Worker threads for sweeps; rayon's global pool when absent
    #[serde(default)]
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub params: ParameterSet,
}

impl Scenario {
    pub fn model(&self) -> Model {
        self.params.model()
    }
}

/// One parameter of one scenario evaluated at several values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub scenario: String,
    /// Dotted path into the scenario's parameters, e.g. `demand.intercept`
    pub parameter: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_directory() -> PathBuf {
    PathBuf::from("results")
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: default_directory(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub run: RunSection,
    #[serde(rename = "scenario", default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub sweep: Option<SweepConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks; parameter domains are checked when solving
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }
        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.name.as_str()) {
                return Err(ConfigError::DuplicateScenario(scenario.name.clone()));
            }
        }

        if let Some(sweep) = &self.sweep {
            let scenario = self
                .scenario(&sweep.scenario)
                .ok_or_else(|| ConfigError::UnknownScenario(sweep.scenario.clone()))?;
            let first = sweep
                .values
                .first()
                .ok_or_else(|| ConfigError::EmptySweep(sweep.parameter.clone()))?;
            // Fail early on a path that does not exist
            scenario.params.with_parameter(&sweep.parameter, *first)?;
        }
        Ok(())
    }

    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}
