//! Vertical (quality) differentiation
//!
//! Consumers with taste θ ~ U[0, θ̄] get θ·s - p from a product of quality s
//! and nothing from not buying. Tastes above θ_H = (p_H - p_L)/(s_H - s_L)
//! buy high quality, tastes between θ_L = p_L/s_L and θ_H buy low quality.

use econ_core::{
    finite, non_negative, output, positive, solve_linear, Result, SolverError, WelfareMetrics,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalParams {
    pub quality_high: f64,
    pub quality_low: f64,
    pub cost_high: f64,
    pub cost_low: f64,
    /// Upper end θ̄ of the taste distribution
    pub max_taste: f64,
    /// Mass of consumers
    pub density: f64,
}

impl VerticalParams {
    pub fn validate(&self) -> Result<()> {
        positive("quality_low", self.quality_low)?;
        positive("quality_high", self.quality_high)?;
        positive("max_taste", self.max_taste)?;
        positive("density", self.density)?;
        non_negative("cost_high", self.cost_high)?;
        non_negative("cost_low", self.cost_low)?;
        // Costs must leave some consumer willing to pay for each product
        for (name, cost, quality) in [
            ("cost_high", self.cost_high, self.quality_high),
            ("cost_low", self.cost_low, self.quality_low),
        ] {
            let ceiling = finite("max_taste * quality", self.max_taste * quality)?;
            if cost >= ceiling {
                return Err(SolverError::invalid(
                    name,
                    format!("must be below the highest willingness to pay {}", ceiling),
                ));
            }
        }
        Ok(())
    }

    fn quality_gap(&self) -> f64 {
        self.quality_high - self.quality_low
    }
}

impl Default for VerticalParams {
    fn default() -> Self {
        VerticalParams {
            quality_high: 2.0,
            quality_low: 1.0,
            cost_high: 0.0,
            cost_low: 0.0,
            max_taste: 1.0,
            density: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalOutcome {
    pub price_high: f64,
    pub price_low: f64,
    /// Taste of the consumer indifferent between the two qualities
    pub high_cutoff: f64,
    /// Taste of the consumer indifferent between low quality and not buying
    pub low_cutoff: f64,
    pub demand_high: f64,
    pub demand_low: f64,
    pub profit_high: f64,
    pub profit_low: f64,
    pub consumer_surplus: f64,
    pub efficient_surplus: f64,
}

impl VerticalOutcome {
    pub fn quality_premium(&self) -> f64 {
        self.price_high - self.price_low
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(
            self.consumer_surplus,
            self.profit_high + self.profit_low,
            self.efficient_surplus,
        )
    }
}

/// ∫ (θ·quality - price) dθ over [lo, hi]
fn segment_surplus(lo: f64, hi: f64, quality: f64, price: f64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    0.5 * quality * (hi * hi - lo * lo) - price * (hi - lo)
}

/// Total surplus when the planner prices both qualities at cost
fn efficient_surplus(params: &VerticalParams) -> f64 {
    let top = params.max_taste;
    let low_cut = (params.cost_low / params.quality_low).clamp(0.0, top);
    let high_cut = ((params.cost_high - params.cost_low) / params.quality_gap()).clamp(0.0, top);
    let scale = params.density / top;

    if high_cut <= low_cut {
        // Low quality is never the better deal
        let cut = (params.cost_high / params.quality_high).clamp(0.0, top);
        return scale * segment_surplus(cut, top, params.quality_high, params.cost_high);
    }
    scale
        * (segment_surplus(low_cut, high_cut, params.quality_low, params.cost_low)
            + segment_surplus(high_cut, top, params.quality_high, params.cost_high))
}

/// Price equilibrium of the high- and low-quality sellers
///
/// First-order conditions:
///
/// ```text
///     2p_H -      p_L = θ̄(s_H - s_L) + c_H
///   -s_L·p_H + 2s_H·p_L = c_L·s_H
/// ```
///
/// The equilibrium must leave both tiers a non-empty interval of tastes,
/// 0 ≤ θ_L < θ_H < θ̄; otherwise segmentation has collapsed.
pub fn vertical(params: &VerticalParams) -> Result<VerticalOutcome> {
    params.validate()?;
    let (s_h, s_l) = (params.quality_high, params.quality_low);
    if s_h <= s_l {
        return Err(SolverError::degenerate(
            "high quality must exceed low quality for the tiers to separate",
        ));
    }
    let gap = params.quality_gap();
    let top = params.max_taste;

    let prices = solve_linear(
        &[vec![2.0, -1.0], vec![-s_l, 2.0 * s_h]],
        &[top * gap + params.cost_high, params.cost_low * s_h],
    )?;
    let (p_h, p_l) = (prices[0], prices[1]);

    let low_cutoff = output("low_cutoff", p_l / s_l)?;
    let high_cutoff = output("high_cutoff", (p_h - p_l) / gap)?;
    if !(0.0 <= low_cutoff && low_cutoff < high_cutoff && high_cutoff < top) {
        return Err(SolverError::degenerate(format!(
            "market segmentation collapsed: cut-offs θ_L = {:.4}, θ_H = {:.4}, θ̄ = {}",
            low_cutoff, high_cutoff, top
        )));
    }

    let scale = params.density / top;
    let demand_high = scale * (top - high_cutoff);
    let demand_low = scale * (high_cutoff - low_cutoff);
    let consumer_surplus = scale
        * (segment_surplus(low_cutoff, high_cutoff, s_l, p_l) + segment_surplus(high_cutoff, top, s_h, p_h));

    let outcome = VerticalOutcome {
        price_high: output("price_high", p_h)?,
        price_low: output("price_low", p_l)?,
        high_cutoff,
        low_cutoff,
        demand_high,
        demand_low,
        profit_high: output("profit_high", (p_h - params.cost_high) * demand_high)?,
        profit_low: output("profit_low", (p_l - params.cost_low) * demand_low)?,
        consumer_surplus: output("consumer_surplus", consumer_surplus)?,
        efficient_surplus: output("efficient_surplus", efficient_surplus(params))?,
    };
    debug!(
        price_high = outcome.price_high,
        price_low = outcome.price_low,
        high_cutoff,
        low_cutoff,
        "vertical differentiation equilibrium"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn costless_qualities_one_and_two() {
        let outcome = vertical(&VerticalParams::default()).unwrap();
        // 2p_H - p_L = 1, -p_H + 4p_L = 0
        assert_abs_diff_eq!(outcome.price_high, 4.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(outcome.price_low, 1.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(outcome.low_cutoff, 1.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(outcome.high_cutoff, 3.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(outcome.demand_high, 4.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(outcome.profit_high, 16.0 / 49.0, epsilon = 1e-12);
        assert!(outcome.quality_premium() > 0.0);
    }

    #[test]
    fn welfare_accounts_for_excluded_and_misallocated_consumers() {
        let w = vertical(&VerticalParams::default()).unwrap().welfare();
        // Planner sells high quality to everyone: ∫₀¹ 2θ dθ = 1
        assert_abs_diff_eq!(w.efficient_surplus, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w.total_surplus, 44.0 / 49.0, epsilon = 1e-12);
        assert!(w.deadweight_loss > 0.0);
    }

    #[test]
    fn equal_qualities_are_degenerate() {
        let params = VerticalParams {
            quality_high: 1.0,
            ..VerticalParams::default()
        };
        assert_eq!(vertical(&params).unwrap_err().kind(), "degenerate-system");
    }

    #[test]
    fn expensive_high_quality_collapses_segmentation() {
        let params = VerticalParams {
            cost_high: 1.9,
            ..VerticalParams::default()
        };
        assert_eq!(vertical(&params).unwrap_err().kind(), "degenerate-system");
    }

    #[test]
    fn cost_above_willingness_to_pay_is_invalid() {
        let params = VerticalParams {
            cost_low: 1.5,
            ..VerticalParams::default()
        };
        assert_eq!(vertical(&params).unwrap_err().kind(), "invalid-parameter");
    }
}
