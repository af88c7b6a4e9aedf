//! Single-market regimes on linear demand
//!
//! All four symmetric regimes share the same outcome record so the caller
//! can line them up side by side (price falls and output rises from
//! monopoly through Cournot to perfect competition).

use std::fmt;

use econ_core::{output, solve_linear, Result, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::params::{DuopolyParams, LinearDemand, MarketParams};

/// Market regime that produced a `MarketOutcome`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    PerfectCompetition,
    Monopoly,
    Cournot,
    Bertrand,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::PerfectCompetition => write!(f, "Perfect Competition"),
            Regime::Monopoly => write!(f, "Monopoly"),
            Regime::Cournot => write!(f, "Cournot"),
            Regime::Bertrand => write!(f, "Bertrand"),
        }
    }
}

/// Symmetric single-market equilibrium
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOutcome {
    pub regime: Regime,
    pub demand: LinearDemand,
    pub marginal_cost: f64,
    pub num_firms: usize,
    pub price: f64,
    pub quantity_per_firm: f64,
    pub market_quantity: f64,
    pub profit_per_firm: f64,
}

impl MarketOutcome {
    fn new(regime: Regime, params: &MarketParams, num_firms: usize, market_quantity: f64) -> Result<Self> {
        let price = output("price", params.demand.price(market_quantity))?;
        let quantity_per_firm = output("quantity_per_firm", market_quantity / num_firms as f64)?;
        let profit_per_firm = (price - params.marginal_cost) * quantity_per_firm;

        let outcome = MarketOutcome {
            regime,
            demand: params.demand,
            marginal_cost: params.marginal_cost,
            num_firms,
            price,
            quantity_per_firm,
            market_quantity: output("market_quantity", market_quantity)?,
            profit_per_firm: output("profit_per_firm", profit_per_firm)?,
        };
        debug!(
            regime = %outcome.regime,
            price = outcome.price,
            quantity = outcome.market_quantity,
            "market equilibrium"
        );
        Ok(outcome)
    }

    /// Price-cost margin relative to price (Lerner index)
    pub fn lerner_index(&self) -> f64 {
        if self.price <= 0.0 {
            return 0.0;
        }
        (self.price - self.marginal_cost) / self.price
    }

    pub fn total_profit(&self) -> f64 {
        self.profit_per_firm * self.num_firms as f64
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(
            self.demand.consumer_surplus(self.market_quantity),
            self.total_profit(),
            self.demand.efficient_surplus(self.marginal_cost),
        )
    }
}

/// Price equals marginal cost; demand determines output
pub fn perfect_competition(params: &MarketParams) -> Result<MarketOutcome> {
    params.validate()?;
    let quantity = params.demand.quantity(params.marginal_cost);
    MarketOutcome::new(Regime::PerfectCompetition, params, params.num_firms, quantity)
}

/// MR = MC on linear demand: Q* = (a - c) / 2b
///
/// The firm count is ignored; a monopoly is one firm.
pub fn monopoly(params: &MarketParams) -> Result<MarketOutcome> {
    params.validate()?;
    let d = &params.demand;
    let quantity = (d.intercept - params.marginal_cost) / (2.0 * d.slope);
    MarketOutcome::new(Regime::Monopoly, params, 1, quantity)
}

/// Symmetric n-firm Cournot: q* = (a - c) / ((n + 1)b)
///
/// Each firm's best response to rivals' output Q₋ᵢ is
/// q = (a - c - bQ₋ᵢ) / 2b; imposing symmetry gives the closed form.
pub fn cournot(params: &MarketParams) -> Result<MarketOutcome> {
    params.validate()?;
    let d = &params.demand;
    let n = params.num_firms as f64;
    let per_firm = (d.intercept - params.marginal_cost) / ((n + 1.0) * d.slope);
    MarketOutcome::new(Regime::Cournot, params, params.num_firms, n * per_firm)
}

/// Homogeneous-good price competition: undercutting drives price to cost
///
/// With a single firm there is nobody to undercut, so the monopoly outcome
/// applies.
pub fn bertrand_homogeneous(params: &MarketParams) -> Result<MarketOutcome> {
    params.validate()?;
    if params.num_firms == 1 {
        let mut outcome = monopoly(params)?;
        outcome.regime = Regime::Bertrand;
        return Ok(outcome);
    }
    let quantity = params.demand.quantity(params.marginal_cost);
    MarketOutcome::new(Regime::Bertrand, params, params.num_firms, quantity)
}

/// The four symmetric regimes solved on the same demand and cost
///
/// Cournot and Bertrand use the configured firm count; the monopoly is one
/// firm and perfect competition ignores the count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketComparison {
    pub perfect_competition: MarketOutcome,
    pub bertrand: MarketOutcome,
    pub cournot: MarketOutcome,
    pub monopoly: MarketOutcome,
}

impl MarketComparison {
    /// Regimes from most to least competitive
    pub fn regimes(&self) -> [&MarketOutcome; 4] {
        [&self.perfect_competition, &self.bertrand, &self.cournot, &self.monopoly]
    }

    /// Surplus of the configured oligopoly
    pub fn welfare(&self) -> WelfareMetrics {
        self.cournot.welfare()
    }
}

pub fn compare_market_structures(params: &MarketParams) -> Result<MarketComparison> {
    Ok(MarketComparison {
        perfect_competition: perfect_competition(params)?,
        bertrand: bertrand_homogeneous(params)?,
        cournot: cournot(params)?,
        monopoly: monopoly(params)?,
    })
}

/// Quantity equilibrium of two firms with different costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuopolyOutcome {
    pub demand: LinearDemand,
    pub costs: [f64; 2],
    pub quantities: [f64; 2],
    pub price: f64,
    pub profits: [f64; 2],
    /// Whether each firm produces a positive quantity
    pub active: [bool; 2],
}

impl DuopolyOutcome {
    pub(crate) fn from_quantities(demand: LinearDemand, costs: [f64; 2], quantities: [f64; 2]) -> Result<Self> {
        let price = output("price", demand.price(quantities[0] + quantities[1]))?;
        let profits = [
            output("profits[0]", (price - costs[0]) * quantities[0])?,
            output("profits[1]", (price - costs[1]) * quantities[1])?,
        ];
        Ok(DuopolyOutcome {
            demand,
            costs,
            quantities,
            price,
            profits,
            active: [quantities[0] > 0.0, quantities[1] > 0.0],
        })
    }

    pub fn market_quantity(&self) -> f64 {
        self.quantities[0] + self.quantities[1]
    }

    pub fn welfare(&self) -> WelfareMetrics {
        homogeneous_welfare(&self.demand, &self.costs, &self.quantities, self.price)
    }
}

/// Welfare on a homogeneous-good market served by firms with constant costs
///
/// The efficient benchmark lets the cheapest firm serve the market at cost.
pub(crate) fn homogeneous_welfare(
    demand: &LinearDemand,
    costs: &[f64],
    quantities: &[f64],
    price: f64,
) -> WelfareMetrics {
    let market_quantity: f64 = quantities.iter().sum();
    let producer: f64 = costs
        .iter()
        .zip(quantities.iter())
        .map(|(c, q)| (price - c) * q)
        .sum();
    let cheapest = costs.iter().copied().fold(f64::INFINITY, f64::min);
    WelfareMetrics::from_surplus(
        demand.consumer_surplus(market_quantity),
        producer,
        demand.efficient_surplus(cheapest),
    )
}

/// Cournot duopoly with asymmetric costs
///
/// Reaction functions 2b·q₁ + b·q₂ = a - c₁ and b·q₁ + 2b·q₂ = a - c₂ are
/// solved simultaneously. A firm whose interior quantity would be negative
/// is shut out and its rival produces the monopoly quantity.
pub fn cournot_duopoly(params: &DuopolyParams) -> Result<DuopolyOutcome> {
    params.validate()?;
    let d = params.demand;
    let [c1, c2] = params.costs;
    let b = d.slope;

    let interior = solve_linear(
        &[vec![2.0 * b, b], vec![b, 2.0 * b]],
        &[d.intercept - c1, d.intercept - c2],
    )?;

    let quantities = if interior[0] < 0.0 {
        [0.0, (d.intercept - c2) / (2.0 * b)]
    } else if interior[1] < 0.0 {
        [(d.intercept - c1) / (2.0 * b), 0.0]
    } else {
        [interior[0], interior[1]]
    };

    DuopolyOutcome::from_quantities(d, params.costs, quantities)
}
