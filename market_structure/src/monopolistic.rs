//! Monopolistic competition with free entry
//!
//! Each of n symmetric firms faces p_i = a - b(q_i + θ·Σ_{j≠i} q_j). For a
//! given n the symmetric Nash quantity is q(n) = (a - c) / (b(2 + θ(n - 1)))
//! with markup p - c = b·q(n). Firms enter until π(n) = b·q(n)² - F reaches
//! zero. Firm counts are integers, so the zero-profit count is rounded down
//! and the incumbents keep a non-negative residual profit.

use econ_core::{bisect, output, IterationOptions, Result, SolverError, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::params::{EntryParams, LinearDemand};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub demand: LinearDemand,
    pub marginal_cost: f64,
    pub fixed_cost: f64,
    pub differentiation: f64,
    /// Operating firms, the zero-profit count rounded down
    pub num_firms: usize,
    /// Real-valued root of π(n) = 0 (0 when no firm can break even)
    pub zero_profit_firms: f64,
    pub price: f64,
    pub quantity_per_firm: f64,
    pub market_quantity: f64,
    pub markup: f64,
    /// Profit per firm at the integer count; the rounding residual
    pub profit_per_firm: f64,
}

impl EntryOutcome {
    pub fn residual_profit(&self) -> f64 {
        self.profit_per_firm
    }

    pub fn welfare(&self) -> WelfareMetrics {
        if self.num_firms == 0 {
            return WelfareMetrics::from_surplus(0.0, 0.0, 0.0);
        }
        let n = self.num_firms as f64;
        let b = self.demand.slope;
        let spread = 1.0 + self.differentiation * (n - 1.0);
        let consumer = 0.5 * b * n * self.quantity_per_firm.powi(2) * spread;

        // Same firms, each pricing at marginal cost and still paying F
        let efficient_q = (self.demand.intercept - self.marginal_cost) / (b * spread);
        let efficient = 0.5 * b * n * efficient_q.powi(2) * spread - n * self.fixed_cost;

        WelfareMetrics::from_surplus(consumer, n * self.profit_per_firm, efficient)
    }
}

fn quantity_per_firm(params: &EntryParams, n: f64) -> f64 {
    (params.demand.intercept - params.marginal_cost)
        / (params.demand.slope * (2.0 + params.differentiation * (n - 1.0)))
}

/// Per-firm profit with n symmetric firms (n may be fractional)
pub fn entry_profit(params: &EntryParams, n: f64) -> f64 {
    let q = quantity_per_firm(params, n);
    params.demand.slope * q * q - params.fixed_cost
}

/// Long-run equilibrium under free entry
pub fn monopolistic_competition(params: &EntryParams, options: &IterationOptions) -> Result<EntryOutcome> {
    params.validate()?;
    let cap = params.max_firms;

    if entry_profit(params, 1.0) < 0.0 {
        debug!(fixed_cost = params.fixed_cost, "no firm can cover its fixed cost");
        return Ok(EntryOutcome {
            demand: params.demand,
            marginal_cost: params.marginal_cost,
            fixed_cost: params.fixed_cost,
            differentiation: params.differentiation,
            num_firms: 0,
            zero_profit_firms: 0.0,
            price: params.demand.intercept,
            quantity_per_firm: 0.0,
            market_quantity: 0.0,
            markup: 0.0,
            profit_per_firm: 0.0,
        });
    }
    if entry_profit(params, cap as f64) > 0.0 {
        return Err(SolverError::degenerate(format!(
            "entry remains profitable at the search bound of {} firms",
            cap
        )));
    }

    let root = bisect(|n| entry_profit(params, n), 1.0, cap as f64, options)?;

    // Bisection lands within tolerance of the root on either side
    let mut n = (root.floor() as usize).clamp(1, cap);
    if n > 1 && entry_profit(params, n as f64) < 0.0 {
        n -= 1;
    }
    if n < cap && entry_profit(params, (n + 1) as f64) >= 0.0 {
        n += 1;
    }

    let q = output("quantity_per_firm", quantity_per_firm(params, n as f64))?;
    let markup = params.demand.slope * q;
    let residual = output("profit_per_firm", entry_profit(params, n as f64))?;
    let outcome = EntryOutcome {
        demand: params.demand,
        marginal_cost: params.marginal_cost,
        fixed_cost: params.fixed_cost,
        differentiation: params.differentiation,
        num_firms: n,
        zero_profit_firms: output("zero_profit_firms", root)?,
        price: output("price", params.marginal_cost + markup)?,
        quantity_per_firm: q,
        market_quantity: output("market_quantity", n as f64 * q)?,
        markup,
        profit_per_firm: residual,
    };

    if residual > options.tolerance {
        warn!(
            zero_profit_firms = root,
            num_firms = n,
            residual_profit = residual,
            "firm count rounded down; incumbents keep a positive profit"
        );
    }
    debug!(num_firms = n, price = outcome.price, "free-entry equilibrium");
    Ok(outcome)
}
