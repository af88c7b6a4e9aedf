//! Price competition with differentiated products
//!
//! Demand for firm i is q_i = α - b·p_i + γ·b·mean(p_j, j ≠ i). The n
//! first-order conditions are linear in prices and are solved as one system.

use econ_core::{output, solve_linear, Result, SolverError, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::params::DifferentiatedParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BertrandOutcome {
    pub prices: Vec<f64>,
    pub quantities: Vec<f64>,
    pub profits: Vec<f64>,
    pub marginal_costs: Vec<f64>,
    /// Representative-consumer surplus at the equilibrium quantities
    pub consumer_surplus: f64,
    /// Total surplus with every firm pricing at marginal cost
    pub efficient_surplus: f64,
}

impl BertrandOutcome {
    pub fn num_firms(&self) -> usize {
        self.prices.len()
    }

    pub fn total_quantity(&self) -> f64 {
        self.quantities.iter().sum()
    }

    /// Quantity-weighted average price
    pub fn average_price(&self) -> f64 {
        let total = self.total_quantity();
        if total <= 0.0 {
            return self.prices.iter().sum::<f64>() / self.prices.len() as f64;
        }
        self.prices
            .iter()
            .zip(&self.quantities)
            .map(|(p, q)| p * q)
            .sum::<f64>()
            / total
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(
            self.consumer_surplus,
            self.profits.iter().sum(),
            self.efficient_surplus,
        )
    }
}

/// Demand-side matrix b·M with M_ii = 1 and M_ij = -γ/(n-1), so that q = α·1 - b·M·p
fn demand_matrix(params: &DifferentiatedParams) -> Vec<Vec<f64>> {
    let n = params.num_firms();
    let b = params.own_price_sensitivity;
    let cross = -params.substitutability * b / (n - 1) as f64;
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { b } else { cross }).collect())
        .collect()
}

fn quantities_at(params: &DifferentiatedParams, prices: &[f64]) -> Vec<f64> {
    let matrix = demand_matrix(params);
    matrix
        .iter()
        .map(|row| params.intercept - row.iter().zip(prices).map(|(m, p)| m * p).sum::<f64>())
        .collect()
}

/// Consumer surplus ½·qᵀ(bM)⁻¹q of the quadratic utility generating the demand system
fn representative_surplus(params: &DifferentiatedParams, quantities: &[f64]) -> Result<f64> {
    let inverse_applied = solve_linear(&demand_matrix(params), quantities)?;
    let surplus = 0.5
        * quantities
            .iter()
            .zip(&inverse_applied)
            .map(|(q, y)| q * y)
            .sum::<f64>();
    output("consumer_surplus", surplus)
}

/// Nash equilibrium in prices
///
/// Firm i's best response satisfies
/// 2b·p_i - (γb/(n-1))·Σ_{j≠i} p_j = α + b·c_i.
/// A singular system (zero own-price sensitivity) is degenerate, as is an
/// interior solution in which some firm would face negative demand.
pub fn bertrand_differentiated(params: &DifferentiatedParams) -> Result<BertrandOutcome> {
    params.validate()?;
    let n = params.num_firms();
    let b = params.own_price_sensitivity;
    let cross = params.substitutability * b / (n - 1) as f64;

    let matrix: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 2.0 * b } else { -cross }).collect())
        .collect();
    let rhs: Vec<f64> = params
        .marginal_costs
        .iter()
        .map(|c| params.intercept + b * c)
        .collect();

    let prices = solve_linear(&matrix, &rhs)?;
    let quantities = quantities_at(params, &prices);

    if let Some((i, q)) = quantities.iter().enumerate().find(|(_, q)| **q < 0.0) {
        return Err(SolverError::degenerate(format!(
            "no equilibrium with all firms active: firm {} faces demand {:.4}",
            i, q
        )));
    }

    let mut profits = Vec::with_capacity(n);
    for (i, ((p, q), c)) in prices
        .iter()
        .zip(&quantities)
        .zip(&params.marginal_costs)
        .enumerate()
    {
        output(&format!("prices[{}]", i), *p)?;
        output(&format!("quantities[{}]", i), *q)?;
        profits.push(output(&format!("profits[{}]", i), (p - c) * q)?);
    }

    let efficient_quantities: Vec<f64> = quantities_at(params, &params.marginal_costs)
        .into_iter()
        .map(|q| q.max(0.0))
        .collect();

    let outcome = BertrandOutcome {
        consumer_surplus: representative_surplus(params, &quantities)?,
        efficient_surplus: representative_surplus(params, &efficient_quantities)?,
        prices,
        quantities,
        profits,
        marginal_costs: params.marginal_costs.clone(),
    };
    debug!(
        firms = n,
        average_price = outcome.average_price(),
        total_quantity = outcome.total_quantity(),
        "differentiated bertrand equilibrium"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn symmetric_duopoly_closed_form() {
        let params = DifferentiatedParams::default();
        let outcome = bertrand_differentiated(&params).unwrap();
        // p = (α + bc)/(b(2 - γ)) = 120/3
        for p in &outcome.prices {
            assert_abs_diff_eq!(*p, 40.0, epsilon = 1e-9);
        }
        for q in &outcome.quantities {
            assert_abs_diff_eq!(*q, 60.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(outcome.profits[0], 1800.0, epsilon = 1e-6);
    }

    #[test]
    fn asymmetric_duopoly_matches_two_by_two_formula() {
        let params = DifferentiatedParams {
            marginal_costs: vec![10.0, 30.0],
            ..DifferentiatedParams::default()
        };
        let outcome = bertrand_differentiated(&params).unwrap();
        let (a, b, g) = (100.0, 2.0, 0.5);
        let denominator = b * (4.0 - g * g);
        let p1 = (2.0 * a + 2.0 * b * 10.0 + g * b * 30.0) / denominator;
        let p2 = (2.0 * a + 2.0 * b * 30.0 + g * b * 10.0) / denominator;
        assert_abs_diff_eq!(outcome.prices[0], p1, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.prices[1], p2, epsilon = 1e-9);
        assert!(outcome.quantities[0] > outcome.quantities[1]);
    }

    #[test]
    fn more_firms_lower_prices() {
        let two = bertrand_differentiated(&DifferentiatedParams::default()).unwrap();
        let five = bertrand_differentiated(&DifferentiatedParams {
            marginal_costs: vec![10.0; 5],
            substitutability: 0.8,
            ..DifferentiatedParams::default()
        })
        .unwrap();
        assert_eq!(five.num_firms(), 5);
        assert!(five.prices[0] > 10.0);
        assert!(five.average_price().is_finite());
        assert!(two.prices[0] > 10.0);
    }

    #[test]
    fn zero_price_sensitivity_is_degenerate() {
        let params = DifferentiatedParams {
            own_price_sensitivity: 0.0,
            ..DifferentiatedParams::default()
        };
        let err = bertrand_differentiated(&params).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
    }

    #[test]
    fn welfare_is_below_marginal_cost_benchmark() {
        let outcome = bertrand_differentiated(&DifferentiatedParams::default()).unwrap();
        let w = outcome.welfare();
        assert!(w.consumer_surplus > 0.0);
        assert!(w.deadweight_loss > 0.0);
        assert!(w.efficiency_ratio < 1.0);
        assert!(w.is_consistent());
    }
}
