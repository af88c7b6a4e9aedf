//! Single entry point over every equilibrium model in the workspace
//!
//! A [`Model`] tag plus a matching [`ParameterSet`] goes into [`solve`]; an
//! [`EquilibriumResult`] comes out, from which [`welfare`] derives the
//! surplus accounting. Scenario files, parameter sweeps and result export sit
//! on top of that:
//!
//! - `config`: TOML scenario files
//! - `sweep`: parallel one-parameter sweeps
//! - `output`: JSON and CSV writers
//! - `run`: executes a scenario file end to end
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod result;
pub mod run;
pub mod solve;
pub mod sweep;

pub use config::{ConfigError, OutputFormat, RunConfig};
pub use model::{Model, ParameterSet};
pub use result::EquilibriumResult;
pub use run::{execute, RunSummary};
pub use solve::{solve, solve_with, welfare};
