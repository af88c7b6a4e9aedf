//! Parallel parameter sweeps
//!
//! Every sweep point is an independent solve on a copy of the base
//! parameters with one field replaced. Points run on a rayon pool and come
//! back in input order; a point that fails carries its own error and does
//! not affect the others.
//!
//! ```
//! use econ_lab::sweep::SweepRunner;
//! use econ_lab::{Model, ParameterSet};
//!
//! let points = SweepRunner::new(ParameterSet::preset(Model::Cournot), "num_firms", vec![1.0, 2.0, 4.0])
//!     .num_threads(2)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(points.len(), 3);
//! assert!(points.iter().all(|p| p.outcome.is_ok()));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use econ_core::{IterationOptions, SolverError};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::ConfigError;
use crate::model::ParameterSet;
use crate::result::EquilibriumResult;
use crate::solve::solve_with;

/// Outcome of the solve at one swept value
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub value: f64,
    pub outcome: Result<EquilibriumResult, SolverError>,
}

pub struct SweepRunner {
    base: ParameterSet,
    parameter: String,
    values: Vec<f64>,
    options: IterationOptions,
    num_threads: Option<usize>,
    progress_callback: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl SweepRunner {
    pub fn new(base: ParameterSet, parameter: impl Into<String>, values: Vec<f64>) -> Self {
        SweepRunner {
            base,
            parameter: parameter.into(),
            values,
            options: IterationOptions::default(),
            num_threads: None,
            progress_callback: None,
        }
    }

    /// Set number of threads (defaults to rayon's global pool)
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    pub fn options(mut self, options: IterationOptions) -> Self {
        self.options = options;
        self
    }

    /// Called with (completed, total) after each point
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    fn solve_point(&self, value: f64) -> SweepPoint {
        let model = self.base.model();
        let outcome = self
            .base
            .with_parameter(&self.parameter, value)
            .and_then(|params| solve_with(model, &params, &self.options));
        if let Err(e) = &outcome {
            warn!(parameter = %self.parameter, value, error = %e, "sweep point failed");
        }
        SweepPoint { value, outcome }
    }

    /// Solve every point and return them in input order
    pub fn run(self) -> Result<Vec<SweepPoint>, ConfigError> {
        let total = self.values.len();
        let completed = AtomicUsize::new(0);
        debug!(
            model = %self.base.model(),
            parameter = %self.parameter,
            points = total,
            "starting sweep"
        );

        let execute = || -> Vec<SweepPoint> {
            self.values
                .par_iter()
                .map(|value| {
                    let point = self.solve_point(*value);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = &self.progress_callback {
                        callback(done, total);
                    }
                    point
                })
                .collect()
        };

        let points = match self.num_threads {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()?
                .install(execute),
            None => execute(),
        };
        Ok(points)
    }
}
