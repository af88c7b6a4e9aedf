//! Salop circular city
//!
//! n firms sit evenly around a circle of unit circumference with consumers
//! of mass d spread uniformly. The symmetric price is p = c + t/n and each
//! firm serves an arc of length 1/n, so profit is t·d/n² - F.

use econ_core::{
    at_least, below, bisect, non_negative, output, positive, IterationOptions, Result, SolverError,
    WelfareMetrics,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::spatial::circular_distance;

/// How the number of firms is determined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SalopEntry {
    /// Exactly `num_firms` firms operate
    Fixed { num_firms: usize },
    /// Firms enter until profit net of the fixed cost reaches zero
    Free { max_firms: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalopParams {
    pub transport_cost: f64,
    pub marginal_cost: f64,
    pub reservation_value: f64,
    /// Mass of consumers on the circle
    pub density: f64,
    /// Per-firm fixed cost
    pub fixed_cost: f64,
    pub entry: SalopEntry,
}

impl SalopParams {
    pub fn validate(&self) -> Result<()> {
        positive("transport_cost", self.transport_cost)?;
        positive("reservation_value", self.reservation_value)?;
        positive("density", self.density)?;
        non_negative("marginal_cost", self.marginal_cost)?;
        below("marginal_cost", self.marginal_cost, self.reservation_value, "reservation_value")?;
        non_negative("fixed_cost", self.fixed_cost)?;
        match self.entry {
            SalopEntry::Fixed { num_firms } => {
                at_least("num_firms", num_firms, 2)?;
            }
            SalopEntry::Free { max_firms } => {
                positive("fixed_cost", self.fixed_cost)?;
                at_least("max_firms", max_firms, 2)?;
            }
        }
        Ok(())
    }

    /// Per-firm profit with n symmetric firms
    pub fn profit(&self, n: f64) -> f64 {
        self.transport_cost * self.density / (n * n) - self.fixed_cost
    }

    /// Total surplus with n firms when every consumer is served at price p:
    /// d(v - c) - t·d/(4n) - nF (prices are transfers)
    pub fn total_surplus(&self, n: f64) -> f64 {
        self.density * (self.reservation_value - self.marginal_cost)
            - self.transport_cost * self.density / (4.0 * n)
            - n * self.fixed_cost
    }
}

impl Default for SalopParams {
    fn default() -> Self {
        SalopParams {
            transport_cost: 1.0,
            marginal_cost: 1.0,
            reservation_value: 5.0,
            density: 1.0,
            fixed_cost: 0.01,
            entry: SalopEntry::Fixed { num_firms: 4 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalopOutcome {
    pub num_firms: usize,
    /// Real-valued zero-profit firm count under free entry
    pub zero_profit_firms: Option<f64>,
    pub price: f64,
    pub firm_spacing: f64,
    pub demand_per_firm: f64,
    /// Net of the fixed cost; the rounding residual under free entry
    pub profit_per_firm: f64,
    pub total_transport_cost: f64,
    pub consumer_surplus: f64,
    /// Welfare-maximising integer firm count at marginal-cost prices
    pub optimal_firms: Option<usize>,
    pub efficient_surplus: f64,
}

impl SalopOutcome {
    /// Position of each firm on the circle, the first at 0
    pub fn locations(&self) -> Vec<f64> {
        (0..self.num_firms).map(|i| i as f64 * self.firm_spacing).collect()
    }

    /// Index of the firm nearest to a consumer at `position`
    pub fn nearest_firm(&self, position: f64) -> usize {
        let position = position.rem_euclid(1.0);
        let mut nearest = 0;
        let mut best = f64::INFINITY;
        for (i, loc) in self.locations().into_iter().enumerate() {
            let distance = circular_distance(position, loc);
            if distance < best {
                best = distance;
                nearest = i;
            }
        }
        nearest
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(
            self.consumer_surplus,
            self.num_firms as f64 * self.profit_per_firm,
            self.efficient_surplus,
        )
    }
}

/// Integer firm count maximising total surplus
///
/// Surplus is concave in n with continuous optimum √(t·d/(4F)); the better
/// of its floor and ceiling (at least one firm) is the integer optimum.
fn optimal_firms(params: &SalopParams) -> Option<usize> {
    if params.fixed_cost <= 0.0 {
        return None;
    }
    let continuous = (params.transport_cost * params.density / (4.0 * params.fixed_cost)).sqrt();
    let lower = (continuous.floor() as usize).max(1);
    let upper = lower + 1;
    if params.total_surplus(upper as f64) > params.total_surplus(lower as f64) {
        Some(upper)
    } else {
        Some(lower)
    }
}

fn free_entry_count(params: &SalopParams, max_firms: usize, options: &IterationOptions) -> Result<(usize, f64)> {
    if params.profit(max_firms as f64) > 0.0 {
        return Err(SolverError::degenerate(format!(
            "entry remains profitable at the search bound of {} firms",
            max_firms
        )));
    }
    if params.profit(1.0) < 0.0 {
        return Err(SolverError::degenerate("not even one firm covers its fixed cost"));
    }
    let root = bisect(|n| params.profit(n), 1.0, max_firms as f64, options)?;

    let mut n = (root.floor() as usize).clamp(1, max_firms);
    if n > 1 && params.profit(n as f64) < 0.0 {
        n -= 1;
    }
    if n < max_firms && params.profit((n + 1) as f64) >= 0.0 {
        n += 1;
    }
    if n < 2 {
        return Err(SolverError::degenerate(format!(
            "free entry supports {} firm(s); the circular city needs at least two",
            n
        )));
    }
    Ok((n, root))
}

pub fn salop(params: &SalopParams, options: &IterationOptions) -> Result<SalopOutcome> {
    params.validate()?;
    let (t, d, c, v) = (
        params.transport_cost,
        params.density,
        params.marginal_cost,
        params.reservation_value,
    );

    let (num_firms, zero_profit_firms) = match params.entry {
        SalopEntry::Fixed { num_firms } => (num_firms, None),
        SalopEntry::Free { max_firms } => {
            let (n, root) = free_entry_count(params, max_firms, options)?;
            (n, Some(root))
        }
    };
    let n = num_firms as f64;

    let price = c + t / n;
    // Farthest consumer sits halfway between neighbours
    if price + t / (2.0 * n) > v {
        return Err(SolverError::degenerate(format!(
            "market not covered with {} firms: delivered price {:.4} exceeds {}",
            num_firms,
            price + t / (2.0 * n),
            v
        )));
    }

    let total_transport_cost = t * d / (4.0 * n);
    let profit_per_firm = output("profit_per_firm", params.profit(n))?;
    let consumer_surplus = d * (v - price) - total_transport_cost;

    let optimal = optimal_firms(params);
    let efficient_surplus = match optimal {
        Some(k) => params.total_surplus(k as f64),
        // Without fixed costs the surplus keeps rising with variety
        None => d * (v - c),
    };

    if let Some(root) = zero_profit_firms {
        if profit_per_firm > options.tolerance {
            warn!(
                zero_profit_firms = root,
                num_firms,
                residual_profit = profit_per_firm,
                "firm count rounded down; incumbents keep a positive profit"
            );
        }
    }

    let outcome = SalopOutcome {
        num_firms,
        zero_profit_firms,
        price: output("price", price)?,
        firm_spacing: 1.0 / n,
        demand_per_firm: d / n,
        profit_per_firm,
        total_transport_cost,
        consumer_surplus: output("consumer_surplus", consumer_surplus)?,
        optimal_firms: optimal,
        efficient_surplus: output("efficient_surplus", efficient_surplus)?,
    };
    debug!(num_firms, price = outcome.price, "salop equilibrium");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn free_entry(fixed_cost: f64) -> SalopParams {
        SalopParams {
            fixed_cost,
            entry: SalopEntry::Free { max_firms: 1000 },
            ..SalopParams::default()
        }
    }

    #[test]
    fn fixed_firms_price_at_cost_plus_t_over_n() {
        let outcome = salop(&SalopParams::default(), &IterationOptions::default()).unwrap();
        assert_abs_diff_eq!(outcome.price, 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(outcome.demand_per_firm, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(outcome.total_transport_cost, 1.0 / 16.0, epsilon = 1e-12);
        // t·d/n² - F = 1/16 - 0.01
        assert_abs_diff_eq!(outcome.profit_per_firm, 0.0525, epsilon = 1e-12);
    }

    #[test]
    fn free_entry_rounds_down() {
        // √(t·d/F) = √(1/0.03) ≈ 5.77
        let outcome = salop(&free_entry(0.03), &IterationOptions::default()).unwrap();
        assert_eq!(outcome.num_firms, 5);
        let root = outcome.zero_profit_firms.unwrap();
        assert!(root > 5.0 && root < 6.0);
        assert!(outcome.profit_per_firm > 0.0);
    }

    #[test]
    fn free_entry_exceeds_social_optimum() {
        let outcome = salop(&free_entry(0.01), &IterationOptions::default()).unwrap();
        assert_eq!(outcome.num_firms, 10);
        // Continuous optimum √(1/0.04) = 5
        assert_eq!(outcome.optimal_firms, Some(5));
        assert!(outcome.welfare().deadweight_loss > 0.0);
    }

    #[test]
    fn fewer_than_two_entrants_is_degenerate() {
        let err = salop(&free_entry(0.5), &IterationOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
    }

    #[test]
    fn uncovered_circle_is_degenerate() {
        let params = SalopParams {
            reservation_value: 1.3,
            ..SalopParams::default()
        };
        assert!(salop(&params, &IterationOptions::default()).is_err());
    }

    #[test]
    fn one_fixed_firm_is_invalid() {
        let params = SalopParams {
            entry: SalopEntry::Fixed { num_firms: 1 },
            ..SalopParams::default()
        };
        let err = salop(&params, &IterationOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
    }

    #[test]
    fn consumers_buy_from_nearest_firm() {
        let outcome = salop(&SalopParams::default(), &IterationOptions::default()).unwrap();
        assert_eq!(outcome.locations(), vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(outcome.nearest_firm(0.3), 1);
        assert_eq!(outcome.nearest_firm(0.9), 0);
    }
}
