use econ_core::{output, Result, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::competition::homogeneous_welfare;
use crate::params::{Leader, LinearDemand, StackelbergParams};

/// A firm's optimal quantity as a function of its rival's quantity
///
/// On P = a - bQ with cost c: R(q) = max(0, (a - c - bq) / 2b).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionFunction {
    demand: LinearDemand,
    cost: f64,
}

impl ReactionFunction {
    pub fn new(demand: LinearDemand, cost: f64) -> Self {
        ReactionFunction { demand, cost }
    }

    pub fn respond(&self, rival_quantity: f64) -> f64 {
        ((self.demand.intercept - self.cost - self.demand.slope * rival_quantity)
            / (2.0 * self.demand.slope))
            .max(0.0)
    }

    /// Rival quantity at and above which the response is zero
    pub fn shutout_quantity(&self) -> f64 {
        (self.demand.intercept - self.cost) / self.demand.slope
    }
}

/// Sequential quantity equilibrium
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackelbergOutcome {
    pub leader: Leader,
    pub demand: LinearDemand,
    pub leader_cost: f64,
    pub follower_cost: f64,
    pub leader_quantity: f64,
    pub follower_quantity: f64,
    pub price: f64,
    pub leader_profit: f64,
    pub follower_profit: f64,
}

impl StackelbergOutcome {
    pub fn market_quantity(&self) -> f64 {
        self.leader_quantity + self.follower_quantity
    }

    /// Quantities indexed by firm rather than by role
    pub fn firm_quantities(&self) -> [f64; 2] {
        match self.leader {
            Leader::FirmOne => [self.leader_quantity, self.follower_quantity],
            Leader::FirmTwo => [self.follower_quantity, self.leader_quantity],
        }
    }

    pub fn welfare(&self) -> WelfareMetrics {
        homogeneous_welfare(
            &self.demand,
            &[self.leader_cost, self.follower_cost],
            &[self.leader_quantity, self.follower_quantity],
            self.price,
        )
    }
}

/// Leader's profit when the follower plays its reaction function
fn leader_profit(demand: &LinearDemand, leader_cost: f64, follower: &ReactionFunction, q_leader: f64) -> f64 {
    let q_follower = follower.respond(q_leader);
    (demand.price(q_leader + q_follower) - leader_cost) * q_leader
}

/// Leader commits first anticipating R_F(q_L); the follower then best-responds
///
/// The leader's substituted profit is concave on each branch of the
/// follower's reaction function (follower active / follower priced out),
/// so the optimum is the better of the two branch maximisers.
pub fn stackelberg(params: &StackelbergParams) -> Result<StackelbergOutcome> {
    params.validate()?;
    let demand = params.demand;
    let (leader_cost, follower_cost) = params.leader_follower_costs();
    let follower = ReactionFunction::new(demand, follower_cost);
    let (a, b) = (demand.intercept, demand.slope);
    let shutout = follower.shutout_quantity();

    // Follower active: π_L = ((a + c_F)/2 - c_L - b·q/2)·q
    let accommodate = ((a + follower_cost - 2.0 * leader_cost) / (2.0 * b)).clamp(0.0, shutout);
    // Follower priced out: plain monopoly profit, restricted to q ≥ shutout
    let deter = ((a - leader_cost) / (2.0 * b)).max(shutout);

    let profit_accommodate = leader_profit(&demand, leader_cost, &follower, accommodate);
    let profit_deter = leader_profit(&demand, leader_cost, &follower, deter);
    let leader_quantity = if profit_deter > profit_accommodate {
        deter
    } else {
        accommodate
    };

    let follower_quantity = follower.respond(leader_quantity);
    let price = output("price", demand.price(leader_quantity + follower_quantity))?;

    let outcome = StackelbergOutcome {
        leader: params.leader,
        demand,
        leader_cost,
        follower_cost,
        leader_quantity: output("leader_quantity", leader_quantity)?,
        follower_quantity: output("follower_quantity", follower_quantity)?,
        price,
        leader_profit: output("leader_profit", (price - leader_cost) * leader_quantity)?,
        follower_profit: output("follower_profit", (price - follower_cost) * follower_quantity)?,
    };
    debug!(
        leader_quantity = outcome.leader_quantity,
        follower_quantity = outcome.follower_quantity,
        price = outcome.price,
        "stackelberg equilibrium"
    );
    Ok(outcome)
}
