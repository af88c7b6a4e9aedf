//! Monopoly pricing of a two-sided platform
//!
//! Side i joins with participation n_i = d_i·(v_i + α_i·n_j - p_i): a user's
//! value rises by α_i for every member of the other side. Working in
//! participation rather than prices, profit is
//!
//! ```text
//! Π = Σ (v_i - f_i)·n_i + (α_A + α_B)·n_A·n_B - n_A²/d_A - n_B²/d_B
//! ```
//!
//! so the platform prices each side below its stand-alone monopoly price by
//! the value that side creates for the other, possibly below zero.
//!
//! Adding back the consumer surplus n_i²/(2·d_i) of each side gives total
//! surplus, and its maximiser is the efficiency benchmark:
//!
//! ```text
//! W = Σ (v_i - f_i)·n_i + (α_A + α_B)·n_A·n_B - n_A²/(2·d_A) - n_B²/(2·d_B)
//! ```
//!
//! W is concave only when 1/(d_A·d_B) > (α_A + α_B)², a stricter bound than
//! the one profit needs.

use econ_core::{non_negative, output, positive, solve_linear, Result, SolverError, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSide {
    pub standalone_value: f64,
    /// Value to one user of each member of the other side
    pub cross_benefit: f64,
    /// Participation per unit of net utility
    pub demand_scale: f64,
    /// Platform's cost of serving one user
    pub serving_cost: f64,
}

impl PlatformSide {
    fn validate(&self, side: &str) -> Result<()> {
        positive(&format!("{}.standalone_value", side), self.standalone_value)?;
        non_negative(&format!("{}.cross_benefit", side), self.cross_benefit)?;
        positive(&format!("{}.demand_scale", side), self.demand_scale)?;
        non_negative(&format!("{}.serving_cost", side), self.serving_cost)?;
        if self.serving_cost >= self.standalone_value {
            return Err(SolverError::invalid(
                format!("{}.serving_cost", side),
                "must be below the side's standalone value",
            ));
        }
        Ok(())
    }

    fn margin(&self) -> f64 {
        self.standalone_value - self.serving_cost
    }

    /// Consumer surplus of `n` participants on a linear participation curve
    fn surplus(&self, n: f64) -> f64 {
        n * n / (2.0 * self.demand_scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformParams {
    pub side_a: PlatformSide,
    pub side_b: PlatformSide,
    /// Whether the platform may pay one side to join
    #[serde(default)]
    pub allow_negative_prices: bool,
}

impl PlatformParams {
    pub fn validate(&self) -> Result<()> {
        self.side_a.validate("side_a")?;
        self.side_b.validate("side_b")
    }

    fn sides(&self) -> [&PlatformSide; 2] {
        [&self.side_a, &self.side_b]
    }

    /// Participation on both sides when prices are fixed
    fn participation(&self, prices: [f64; 2]) -> Result<[f64; 2]> {
        let (a, b) = (&self.side_a, &self.side_b);
        let n = solve_linear(
            &[
                vec![1.0, -a.demand_scale * a.cross_benefit],
                vec![-b.demand_scale * b.cross_benefit, 1.0],
            ],
            &[
                a.demand_scale * (a.standalone_value - prices[0]),
                b.demand_scale * (b.standalone_value - prices[1]),
            ],
        )?;
        let n = [n[0], n[1]];
        if n.iter().any(|x| *x < 0.0) {
            return Err(SolverError::degenerate(format!(
                "participation has no non-negative solution at prices {:?}",
                prices
            )));
        }
        Ok(n)
    }

    /// Prices that support participation `n`
    fn prices_for(&self, n: [f64; 2]) -> [f64; 2] {
        let (a, b) = (&self.side_a, &self.side_b);
        [
            a.standalone_value + a.cross_benefit * n[1] - n[0] / a.demand_scale,
            b.standalone_value + b.cross_benefit * n[0] - n[1] / b.demand_scale,
        ]
    }

    fn profit(&self, prices: [f64; 2], n: [f64; 2]) -> f64 {
        self.sides()
            .iter()
            .zip(prices.iter().zip(n.iter()))
            .map(|(side, (p, n))| (p - side.serving_cost) * n)
            .sum()
    }

    /// Consumer surplus plus profit at participation `n`
    fn total_surplus(&self, n: [f64; 2]) -> f64 {
        let spillover = self.side_a.cross_benefit + self.side_b.cross_benefit;
        self.sides()
            .iter()
            .zip(n.iter())
            .map(|(side, n)| side.margin() * n - side.surplus(*n))
            .sum::<f64>()
            + spillover * n[0] * n[1]
    }

    /// Participation a surplus-maximising planner would choose
    fn efficient_participation(&self) -> Result<[f64; 2]> {
        let (a, b) = (&self.side_a, &self.side_b);
        let spillover = a.cross_benefit + b.cross_benefit;
        if 1.0 / (a.demand_scale * b.demand_scale) - spillover * spillover <= 0.0 {
            return Err(SolverError::degenerate(format!(
                "cross-side benefits {} too strong: total surplus is unbounded",
                spillover
            )));
        }
        let n = solve_linear(
            &[
                vec![1.0 / a.demand_scale, -spillover],
                vec![-spillover, 1.0 / b.demand_scale],
            ],
            &[a.margin(), b.margin()],
        )?;
        Ok([n[0], n[1]])
    }
}

impl Default for PlatformParams {
    fn default() -> Self {
        let side = PlatformSide {
            standalone_value: 8.0,
            cross_benefit: 0.25,
            demand_scale: 1.0,
            serving_cost: 2.0,
        };
        PlatformParams {
            side_a: side,
            side_b: side,
            allow_negative_prices: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformOutcome {
    pub prices: [f64; 2],
    pub participation: [f64; 2],
    /// Profit-maximising prices before any non-negativity clamp
    pub unconstrained_prices: [f64; 2],
    pub unconstrained_profit: f64,
    pub profit: f64,
    /// Total subsidy the platform would have paid had negative prices been
    /// allowed; zero when no price was clamped
    pub subsidy_gap: f64,
    pub consumer_surplus: [f64; 2],
    /// Largest total surplus over any participation pair
    pub efficient_surplus: f64,
}

impl PlatformOutcome {
    pub fn clamped(&self) -> bool {
        self.subsidy_gap > 0.0
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(
            self.consumer_surplus.iter().sum(),
            self.profit,
            self.efficient_surplus,
        )
    }
}

pub fn two_sided_platform(params: &PlatformParams) -> Result<PlatformOutcome> {
    params.validate()?;
    let (a, b) = (&params.side_a, &params.side_b);
    let spillover = a.cross_benefit + b.cross_benefit;

    // Second-order condition: the profit Hessian must be negative definite
    let curvature = 4.0 / (a.demand_scale * b.demand_scale) - spillover * spillover;
    if curvature <= 0.0 {
        return Err(SolverError::degenerate(format!(
            "cross-side benefits {} too strong: platform profit is unbounded",
            spillover
        )));
    }

    let n = solve_linear(
        &[
            vec![2.0 / a.demand_scale, -spillover],
            vec![-spillover, 2.0 / b.demand_scale],
        ],
        &[a.margin(), b.margin()],
    )?;
    let optimal_n = [n[0], n[1]];
    let unconstrained_prices = params.prices_for(optimal_n);
    let unconstrained_profit = output("unconstrained_profit", params.profit(unconstrained_prices, optimal_n))?;

    let needs_clamp = !params.allow_negative_prices && unconstrained_prices.iter().any(|p| *p < 0.0);
    let (prices, participation, subsidy_gap) = if needs_clamp {
        let prices = unconstrained_prices.map(|p| p.max(0.0));
        let gap: f64 = unconstrained_prices.iter().map(|p| (-p).max(0.0)).sum();
        let participation = params.participation(prices)?;
        warn!(
            ?unconstrained_prices,
            subsidy_gap = gap,
            "negative platform price clamped to zero; prices are not an equilibrium"
        );
        (prices, participation, gap)
    } else {
        (unconstrained_prices, optimal_n, 0.0)
    };

    let efficient_surplus = params.total_surplus(params.efficient_participation()?);

    let outcome = PlatformOutcome {
        prices: [output("price_a", prices[0])?, output("price_b", prices[1])?],
        participation,
        unconstrained_prices,
        unconstrained_profit,
        profit: output("profit", params.profit(prices, participation))?,
        subsidy_gap,
        consumer_surplus: [a.surplus(participation[0]), b.surplus(participation[1])],
        efficient_surplus: output("efficient_surplus", efficient_surplus)?,
    };
    debug!(
        price_a = outcome.prices[0],
        price_b = outcome.prices[1],
        profit = outcome.profit,
        "two-sided platform"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Side A ignores side B, side B values side A a lot
    fn lopsided(allow_negative_prices: bool) -> PlatformParams {
        PlatformParams {
            side_a: PlatformSide {
                standalone_value: 6.0,
                cross_benefit: 0.0,
                demand_scale: 0.25,
                serving_cost: 2.0,
            },
            side_b: PlatformSide {
                standalone_value: 12.0,
                cross_benefit: 1.0,
                demand_scale: 2.0,
                serving_cost: 2.0,
            },
            allow_negative_prices,
        }
    }

    #[test]
    fn symmetric_platform() {
        let outcome = two_sided_platform(&PlatformParams::default()).unwrap();
        // 2n - n/2 = 6 on each side
        assert_abs_diff_eq!(outcome.participation[0], 4.0, epsilon = 1e-10);
        assert_abs_diff_eq!(outcome.prices[0], 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(outcome.prices[1], 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(outcome.profit, 24.0, epsilon = 1e-9);
        assert!(!outcome.clamped());
    }

    #[test]
    fn platform_withholds_participation() {
        let w = two_sided_platform(&PlatformParams::default()).unwrap().welfare();
        // The planner sets n - n/2 = 6, so n = 12 per side at a price of -1
        assert_abs_diff_eq!(w.efficient_surplus, 72.0, epsilon = 1e-9);
        assert_abs_diff_eq!(w.total_surplus, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(w.deadweight_loss, 32.0, epsilon = 1e-9);
        assert!(w.is_consistent());
    }

    #[test]
    fn subsidised_side_when_negative_prices_allowed() {
        let outcome = two_sided_platform(&lopsided(true)).unwrap();
        assert_abs_diff_eq!(outcome.participation[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.participation[1], 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.prices[0], -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.prices[1], 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.profit, 64.0, epsilon = 1e-9);
        assert_eq!(outcome.subsidy_gap, 0.0);
    }

    #[test]
    fn subsidised_platform_falls_short_of_the_planner() {
        for allow in [true, false] {
            let w = two_sided_platform(&lopsided(allow)).unwrap().welfare();
            // Planner: 4n_A - n_B = 4, n_B/2 - n_A = 10, so n = (12, 44)
            assert_abs_diff_eq!(w.efficient_surplus, 244.0, epsilon = 1e-9);
            assert!(w.efficiency_ratio <= 1.0, "ratio {}", w.efficiency_ratio);
            assert!(w.deadweight_loss > 0.0);
            assert!(w.is_consistent());
        }
        let unconstrained = two_sided_platform(&lopsided(true)).unwrap().welfare();
        assert_abs_diff_eq!(unconstrained.total_surplus, 108.0, epsilon = 1e-9);
    }

    #[test]
    fn negative_price_is_clamped_and_gap_reported() {
        let outcome = two_sided_platform(&lopsided(false)).unwrap();
        assert!(outcome.clamped());
        assert_abs_diff_eq!(outcome.subsidy_gap, 2.0, epsilon = 1e-9);
        assert_eq!(outcome.prices[0], 0.0);
        // n_A = 0.25 · 6, n_B = 2 · (12 + n_A - 8)
        assert_abs_diff_eq!(outcome.participation[0], 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.participation[1], 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.profit, 63.0, epsilon = 1e-9);
        assert!(outcome.profit < outcome.unconstrained_profit);
    }

    #[test]
    fn explosive_cross_benefits_are_degenerate() {
        let base = PlatformParams::default();
        let params = PlatformParams {
            side_a: PlatformSide {
                cross_benefit: 1.5,
                ..base.side_a
            },
            side_b: PlatformSide {
                cross_benefit: 1.0,
                ..base.side_b
            },
            ..base
        };
        let err = two_sided_platform(&params).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
    }

    #[test]
    fn unbounded_total_surplus_is_degenerate() {
        // Profit is concave (4 > 2.25) but total surplus is not (1 < 2.25)
        let base = PlatformParams::default();
        let side = PlatformSide {
            cross_benefit: 0.75,
            ..base.side_a
        };
        let params = PlatformParams {
            side_a: side,
            side_b: side,
            ..base
        };
        let err = two_sided_platform(&params).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
        assert!(err.to_string().contains("total surplus"));
    }

    #[test]
    fn serving_cost_above_value_is_invalid() {
        let base = PlatformParams::default();
        let params = PlatformParams {
            side_b: PlatformSide {
                serving_cost: 12.0,
                ..base.side_b
            },
            ..base
        };
        assert_eq!(two_sided_platform(&params).unwrap_err().kind(), "invalid-parameter");
    }
}
