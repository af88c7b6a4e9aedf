//! Hotelling linear city
//!
//! Consumers are spread with density d over [0, L]. A consumer at x buying
//! from firm i pays p_i + t·|x - x_i| and values the good at v. With firm 1
//! to the left of firm 2, the indifferent consumer sits at
//! x* = (p₂ - p₁)/(2t) + m, m = (x₁ + x₂)/2, and the pricing first-order
//! conditions are
//!
//! ```text
//!  2p₁ -  p₂ = c₁ + 2tm
//! - p₁ + 2p₂ = c₂ + 2t(L - m)
//! ```

use econ_core::{
    below, non_negative, output, positive, solve_linear, Result, SolverError, WelfareMetrics,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spatial::distance_integral;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotellingParams {
    pub city_length: f64,
    pub density: f64,
    /// Cost per unit distance travelled
    pub transport_cost: f64,
    /// Firm locations, left firm first
    pub locations: [f64; 2],
    pub marginal_costs: [f64; 2],
    /// Every consumer's gross value of the good
    pub reservation_value: f64,
}

impl HotellingParams {
    pub fn validate(&self) -> Result<()> {
        positive("city_length", self.city_length)?;
        positive("density", self.density)?;
        positive("transport_cost", self.transport_cost)?;
        positive("reservation_value", self.reservation_value)?;
        for i in 0..2 {
            let loc = format!("locations[{}]", i);
            non_negative(&loc, self.locations[i])?;
            if self.locations[i] > self.city_length {
                return Err(SolverError::invalid(loc, "must lie within the city"));
            }
            let cost = format!("marginal_costs[{}]", i);
            non_negative(&cost, self.marginal_costs[i])?;
            below(&cost, self.marginal_costs[i], self.reservation_value, "reservation_value")?;
        }
        if self.locations[0] > self.locations[1] {
            return Err(SolverError::invalid("locations", "firm 1 must be left of firm 2"));
        }
        Ok(())
    }

    fn midpoint(&self) -> f64 {
        0.5 * (self.locations[0] + self.locations[1])
    }
}

impl Default for HotellingParams {
    /// Unit city with firms at the quartiles
    fn default() -> Self {
        HotellingParams {
            city_length: 1.0,
            density: 1.0,
            transport_cost: 10.0,
            locations: [0.25, 0.75],
            marginal_costs: [20.0, 20.0],
            reservation_value: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotellingOutcome {
    pub prices: [f64; 2],
    pub indifferent_consumer: f64,
    pub demands: [f64; 2],
    /// Share of the city served by each firm
    pub market_shares: [f64; 2],
    pub profits: [f64; 2],
    pub total_transport_cost: f64,
    pub consumer_surplus: f64,
    /// Surplus when the planner assigns consumers at marginal cost
    pub efficient_surplus: f64,
}

impl HotellingOutcome {
    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(
            self.consumer_surplus,
            self.profits[0] + self.profits[1],
            self.efficient_surplus,
        )
    }
}

/// Travel cost paid by all consumers when the boundary between the two
/// firms' territories is at `boundary`
fn travel_cost(params: &HotellingParams, boundary: f64) -> f64 {
    let [x1, x2] = params.locations;
    params.transport_cost
        * params.density
        * (distance_integral(0.0, boundary, x1) + distance_integral(boundary, params.city_length, x2))
}

/// Cost-minimising boundary: consumers go to the firm with the lower
/// delivered cost c_i + t·|x - x_i|
fn efficient_boundary(params: &HotellingParams) -> f64 {
    let [x1, x2] = params.locations;
    let [c1, c2] = params.marginal_costs;
    let boundary = (c2 - c1) / (2.0 * params.transport_cost) + params.midpoint();
    if boundary < x1 {
        0.0
    } else if boundary > x2 {
        params.city_length
    } else {
        boundary
    }
}

pub fn hotelling(params: &HotellingParams) -> Result<HotellingOutcome> {
    params.validate()?;
    let [x1, x2] = params.locations;
    let [c1, c2] = params.marginal_costs;
    let (t, d, l, v) = (
        params.transport_cost,
        params.density,
        params.city_length,
        params.reservation_value,
    );
    if x1 == x2 {
        return Err(SolverError::degenerate(
            "co-located firms sell identical goods; no interior price equilibrium",
        ));
    }

    let m = params.midpoint();
    let prices = solve_linear(
        &[vec![2.0, -1.0], vec![-1.0, 2.0]],
        &[c1 + 2.0 * t * m, c2 + 2.0 * t * (l - m)],
    )?;
    let (p1, p2) = (prices[0], prices[1]);

    let boundary = output("indifferent_consumer", (p2 - p1) / (2.0 * t) + m)?;
    if boundary < x1 || boundary > x2 {
        return Err(SolverError::degenerate(format!(
            "indifferent consumer at {:.4} lies outside the firms' interval [{}, {}]",
            boundary, x1, x2
        )));
    }

    // Highest delivered price is paid at a city edge or at the boundary
    let worst = [p1 + t * x1, p1 + t * (boundary - x1), p2 + t * (l - x2)]
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    if worst > v {
        return Err(SolverError::degenerate(format!(
            "market not covered: delivered price {:.4} exceeds reservation value {}",
            worst, v
        )));
    }

    let demands = [d * boundary, d * (l - boundary)];
    let profits = [
        output("profits[0]", (p1 - c1) * demands[0])?,
        output("profits[1]", (p2 - c2) * demands[1])?,
    ];
    let total_transport_cost = output("total_transport_cost", travel_cost(params, boundary))?;
    let gross = v * d * l;
    let consumer_surplus = gross - p1 * demands[0] - p2 * demands[1] - total_transport_cost;

    let planner = efficient_boundary(params);
    let efficient_surplus =
        gross - c1 * d * planner - c2 * d * (l - planner) - travel_cost(params, planner);

    let outcome = HotellingOutcome {
        prices: [output("prices[0]", p1)?, output("prices[1]", p2)?],
        indifferent_consumer: boundary,
        demands,
        market_shares: [boundary / l, 1.0 - boundary / l],
        profits,
        total_transport_cost,
        consumer_surplus: output("consumer_surplus", consumer_surplus)?,
        efficient_surplus: output("efficient_surplus", efficient_surplus)?,
    };
    debug!(
        p1 = outcome.prices[0],
        p2 = outcome.prices[1],
        boundary,
        "hotelling equilibrium"
    );
    Ok(outcome)
}
