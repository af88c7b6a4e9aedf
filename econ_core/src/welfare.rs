use serde::{Deserialize, Serialize};

/// Surplus below this magnitude counts as zero when forming ratios
const SURPLUS_EPSILON: f64 = 1e-12;

/// Welfare record derived from an equilibrium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelfareMetrics {
    pub consumer_surplus: f64,
    pub producer_surplus: f64,
    pub total_surplus: f64,
    /// Total surplus of the efficient benchmark for the same primitives
    pub efficient_surplus: f64,
    /// Shortfall against the efficient benchmark, never negative
    pub deadweight_loss: f64,
    /// `total_surplus / efficient_surplus` (1.0 when the benchmark is zero)
    pub efficiency_ratio: f64,
}

impl WelfareMetrics {
    /// Assemble the record from its two surplus components and the
    /// efficient benchmark
    ///
    /// # Examples
    ///
    /// ```
    /// use econ_core::WelfareMetrics;
    ///
    /// // Monopoly on P = 100 - Q with c = 20
    /// let w = WelfareMetrics::from_surplus(800.0, 1600.0, 3200.0);
    /// assert_eq!(w.total_surplus, 2400.0);
    /// assert_eq!(w.deadweight_loss, 800.0);
    /// assert_eq!(w.efficiency_ratio, 0.75);
    /// ```
    pub fn from_surplus(consumer_surplus: f64, producer_surplus: f64, efficient_surplus: f64) -> Self {
        let total_surplus = consumer_surplus + producer_surplus;
        let shortfall = efficient_surplus - total_surplus;
        // Rounding noise can push the shortfall a hair below zero
        let deadweight_loss = if shortfall > SURPLUS_EPSILON * efficient_surplus.abs().max(1.0) {
            shortfall
        } else {
            0.0
        };
        let efficiency_ratio = if efficient_surplus.abs() < SURPLUS_EPSILON {
            1.0
        } else {
            total_surplus / efficient_surplus
        };

        WelfareMetrics {
            consumer_surplus,
            producer_surplus,
            total_surplus,
            efficient_surplus,
            deadweight_loss,
            efficiency_ratio,
        }
    }

    /// Welfare of an outcome that is efficient by construction
    pub fn efficient(consumer_surplus: f64, producer_surplus: f64) -> Self {
        Self::from_surplus(
            consumer_surplus,
            producer_surplus,
            consumer_surplus + producer_surplus,
        )
    }

    /// Check the record's internal accounting
    pub fn is_consistent(&self) -> bool {
        let total_ok = (self.total_surplus - self.consumer_surplus - self.producer_surplus).abs()
            <= 1e-9 * self.total_surplus.abs().max(1.0);
        total_ok && self.deadweight_loss >= 0.0 && self.efficiency_ratio.is_finite()
    }
}
