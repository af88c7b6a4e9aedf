use econ_core::{at_least, below, in_range, non_negative, positive, Result, SolverError};
use serde::{Deserialize, Serialize};

/// Linear inverse demand P = a - bQ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearDemand {
    /// Choke price a (price at which quantity demanded is zero)
    pub intercept: f64,
    /// Slope b of the inverse demand curve
    pub slope: f64,
}

impl LinearDemand {
    pub fn new(intercept: f64, slope: f64) -> Result<Self> {
        let demand = LinearDemand { intercept, slope };
        demand.validate()?;
        Ok(demand)
    }

    pub fn validate(&self) -> Result<()> {
        positive("demand.intercept", self.intercept)?;
        positive("demand.slope", self.slope)?;
        Ok(())
    }

    /// Market price for total quantity Q (never below zero)
    pub fn price(&self, quantity: f64) -> f64 {
        (self.intercept - self.slope * quantity).max(0.0)
    }

    /// Quantity demanded at price P
    pub fn quantity(&self, price: f64) -> f64 {
        ((self.intercept - price) / self.slope).max(0.0)
    }

    /// Consumer surplus triangle under the curve above price for quantity Q
    pub fn consumer_surplus(&self, quantity: f64) -> f64 {
        0.5 * self.slope * quantity * quantity
    }

    /// Total surplus at marginal-cost pricing with constant cost c
    pub fn efficient_surplus(&self, marginal_cost: f64) -> f64 {
        let margin = (self.intercept - marginal_cost).max(0.0);
        margin * margin / (2.0 * self.slope)
    }

    /// Every model rejects costs at or above the choke price: no positive
    /// quantity would be economically meaningful
    pub fn check_cost(&self, name: &str, cost: f64) -> Result<f64> {
        non_negative(name, cost)?;
        below(name, cost, self.intercept, "demand.intercept")
    }
}

impl Default for LinearDemand {
    /// The classroom market P = 100 - Q
    fn default() -> Self {
        LinearDemand {
            intercept: 100.0,
            slope: 1.0,
        }
    }
}

/// Symmetric single-market parameters shared by the textbook regimes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketParams {
    pub demand: LinearDemand,
    pub marginal_cost: f64,
    pub num_firms: usize,
}

impl MarketParams {
    pub fn new(demand: LinearDemand, marginal_cost: f64, num_firms: usize) -> Result<Self> {
        let params = MarketParams {
            demand,
            marginal_cost,
            num_firms,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        self.demand.validate()?;
        self.demand.check_cost("marginal_cost", self.marginal_cost)?;
        at_least("num_firms", self.num_firms, 1)?;
        Ok(())
    }

    /// P = 100 - Q with c = 20
    pub fn classroom(num_firms: usize) -> Self {
        MarketParams {
            demand: LinearDemand::default(),
            marginal_cost: 20.0,
            num_firms,
        }
    }
}

impl Default for MarketParams {
    fn default() -> Self {
        MarketParams::classroom(1)
    }
}

/// Two firms with possibly different constant marginal costs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuopolyParams {
    pub demand: LinearDemand,
    pub costs: [f64; 2],
}

impl DuopolyParams {
    pub fn new(demand: LinearDemand, costs: [f64; 2]) -> Result<Self> {
        let params = DuopolyParams { demand, costs };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        self.demand.validate()?;
        self.demand.check_cost("costs[0]", self.costs[0])?;
        self.demand.check_cost("costs[1]", self.costs[1])?;
        Ok(())
    }
}

impl Default for DuopolyParams {
    fn default() -> Self {
        DuopolyParams {
            demand: LinearDemand::default(),
            costs: [20.0, 20.0],
        }
    }
}

/// Which of the two duopolists moves first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Leader {
    FirmOne,
    FirmTwo,
}

/// Sequential quantity game: the leader commits, the follower responds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackelbergParams {
    pub demand: LinearDemand,
    pub costs: [f64; 2],
    pub leader: Leader,
}

impl StackelbergParams {
    pub fn validate(&self) -> Result<()> {
        DuopolyParams {
            demand: self.demand,
            costs: self.costs,
        }
        .validate()
    }

    /// (leader cost, follower cost)
    pub fn leader_follower_costs(&self) -> (f64, f64) {
        match self.leader {
            Leader::FirmOne => (self.costs[0], self.costs[1]),
            Leader::FirmTwo => (self.costs[1], self.costs[0]),
        }
    }
}

impl Default for StackelbergParams {
    fn default() -> Self {
        StackelbergParams {
            demand: LinearDemand::default(),
            costs: [20.0, 20.0],
            leader: Leader::FirmOne,
        }
    }
}

/// Price competition with differentiated products
///
/// Firm i sells q_i = intercept - b·p_i + γ·b·mean(p_j, j ≠ i).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentiatedParams {
    /// Quantity demanded from a firm when every price is zero
    pub intercept: f64,
    /// Own-price sensitivity b
    pub own_price_sensitivity: f64,
    /// Degree of substitutability γ in [0, 1); 0 = independent goods
    pub substitutability: f64,
    /// One marginal cost per firm (at least two firms)
    pub marginal_costs: Vec<f64>,
}

impl DifferentiatedParams {
    pub fn validate(&self) -> Result<()> {
        positive("intercept", self.intercept)?;
        // Zero sensitivity is allowed through: it makes the best-response
        // system singular, which the solver reports as degenerate
        non_negative("own_price_sensitivity", self.own_price_sensitivity)?;
        in_range("substitutability", self.substitutability, 0.0, 1.0)?;
        if self.substitutability >= 1.0 {
            return Err(SolverError::invalid(
                "substitutability",
                "must be below 1; perfect substitutes are the homogeneous Bertrand model",
            ));
        }
        at_least("marginal_costs", self.marginal_costs.len(), 2)?;
        for (i, &cost) in self.marginal_costs.iter().enumerate() {
            let name = format!("marginal_costs[{}]", i);
            non_negative(&name, cost)?;
            below(&name, cost, self.intercept, "intercept")?;
        }
        Ok(())
    }

    pub fn num_firms(&self) -> usize {
        self.marginal_costs.len()
    }
}

impl Default for DifferentiatedParams {
    fn default() -> Self {
        DifferentiatedParams {
            intercept: 100.0,
            own_price_sensitivity: 2.0,
            substitutability: 0.5,
            marginal_costs: vec![10.0, 10.0],
        }
    }
}

/// Monopolistic competition with free entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryParams {
    pub demand: LinearDemand,
    pub marginal_cost: f64,
    /// Fixed (entry) cost every operating firm pays
    pub fixed_cost: f64,
    /// Cross-product demand weight θ in (0, 1]; 1 = homogeneous goods
    pub differentiation: f64,
    /// Upper end of the firm-count search
    pub max_firms: usize,
}

impl EntryParams {
    pub fn validate(&self) -> Result<()> {
        self.demand.validate()?;
        self.demand.check_cost("marginal_cost", self.marginal_cost)?;
        positive("fixed_cost", self.fixed_cost)?;
        positive("differentiation", self.differentiation)?;
        in_range("differentiation", self.differentiation, 0.0, 1.0)?;
        at_least("max_firms", self.max_firms, 2)?;
        Ok(())
    }
}

impl Default for EntryParams {
    fn default() -> Self {
        EntryParams {
            demand: LinearDemand::default(),
            marginal_cost: 20.0,
            fixed_cost: 100.0,
            differentiation: 0.5,
            max_firms: 10_000,
        }
    }
}
