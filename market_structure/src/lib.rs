//! Single-market equilibria: competitive, monopoly, oligopoly and free entry
//!
//! All models share linear inverse demand `P = a - bQ` with constant
//! marginal costs. Each solver validates its parameters, computes the
//! equilibrium in closed form or through a small linear system, and returns
//! an outcome record that can derive its own `WelfareMetrics`.

pub mod bertrand;
pub mod competition;
pub mod monopolistic;
pub mod params;
pub mod stackelberg;

pub use bertrand::{bertrand_differentiated, BertrandOutcome};
pub use competition::{
    bertrand_homogeneous, compare_market_structures, cournot, cournot_duopoly, monopoly,
    perfect_competition, DuopolyOutcome, MarketComparison, MarketOutcome, Regime,
};
pub use monopolistic::{entry_profit, monopolistic_competition, EntryOutcome};
pub use params::{
    DifferentiatedParams, DuopolyParams, EntryParams, Leader, LinearDemand, MarketParams,
    StackelbergParams,
};
pub use stackelberg::{stackelberg, ReactionFunction, StackelbergOutcome};
