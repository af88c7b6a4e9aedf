//! Seeded Monte Carlo check on the analytic revenue

use econ_core::{at_least, Result, SolverError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::outcome::realize;
use crate::params::{AuctionParams, ValuationDistribution};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloEstimate {
    pub mean_revenue: f64,
    /// Standard error of the mean
    pub std_error: f64,
    pub sale_rate: f64,
    pub efficiency_rate: f64,
    pub draws: usize,
}

/// Average realized revenue over `draws` independent valuation profiles
///
/// The same `seed` always produces the same estimate.
pub fn simulate_revenue(params: &AuctionParams, draws: usize, seed: u64) -> Result<MonteCarloEstimate> {
    params.validate()?;
    at_least("draws", draws, 2)?;

    let ValuationDistribution::Uniform { low, high } = params.distribution;
    let values = Uniform::new_inclusive(low, high)
        .map_err(|e| SolverError::invalid("distribution", e.to_string()))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut sales = 0usize;
    let mut efficient = 0usize;
    let mut trial = params.clone();
    for _ in 0..draws {
        trial.valuations = Some((0..params.num_bidders).map(|_| values.sample(&mut rng)).collect());
        let outcome = realize(&trial)?;
        sum += outcome.payment;
        sum_sq += outcome.payment * outcome.payment;
        if outcome.sold() {
            sales += 1;
            if outcome.efficient {
                efficient += 1;
            }
        }
    }

    let n = draws as f64;
    let mean_revenue = sum / n;
    let variance = ((sum_sq - n * mean_revenue * mean_revenue) / (n - 1.0)).max(0.0);
    let estimate = MonteCarloEstimate {
        mean_revenue,
        std_error: (variance / n).sqrt(),
        sale_rate: sales as f64 / n,
        efficiency_rate: efficient as f64 / n,
        draws,
    };
    debug!(
        format = %params.format,
        draws,
        mean_revenue,
        std_error = estimate.std_error,
        "monte carlo revenue"
    );
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AuctionFormat;
    use crate::revenue::expected_revenue;

    #[test]
    fn same_seed_same_estimate() {
        let params = AuctionParams::default();
        let a = simulate_revenue(&params, 500, 7).unwrap();
        let b = simulate_revenue(&params, 500, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn estimate_brackets_analytic_revenue() {
        for format in AuctionFormat::ALL {
            let params = AuctionParams {
                format,
                num_bidders: 3,
                reserve_price: 0.25,
                ..AuctionParams::default()
            };
            let analytic = expected_revenue(&params).unwrap().revenue;
            let estimate = simulate_revenue(&params, 20_000, 42).unwrap();
            // Five standard errors is far outside sampling noise
            assert!(
                (estimate.mean_revenue - analytic).abs() < 5.0 * estimate.std_error,
                "{}: simulated {} vs analytic {}",
                format,
                estimate.mean_revenue,
                analytic
            );
        }
    }

    #[test]
    fn symmetric_bidding_is_efficient_whenever_sold() {
        let estimate = simulate_revenue(&AuctionParams::default(), 1000, 3).unwrap();
        assert_eq!(estimate.sale_rate, 1.0);
        assert_eq!(estimate.efficiency_rate, 1.0);
    }

    #[test]
    fn too_few_draws_is_invalid() {
        assert!(simulate_revenue(&AuctionParams::default(), 1, 0).is_err());
    }
}
