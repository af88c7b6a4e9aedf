//! Strategic interaction between firms
//!
//! Normal-form games are analysed for dominant strategies and pure Nash
//! equilibria; the repeated prisoner's dilemma is analysed for grim-trigger
//! sustainability and can be simulated between history-dependent strategies.

pub mod analysis;
pub mod investment;
pub mod matrix;
pub mod repeated;

pub use analysis::{analyze, Dominance, DominantStrategy, Equilibrium, GameAnalysis};
pub use investment::{investment_decision, InvestmentDecision, InvestmentParams};
pub use matrix::{
    entry_game, pricing_game, prisoners_dilemma, EntryGameParams, PayoffMatrix, MAX_STRATEGIES,
};
pub use repeated::{
    grim_trigger, simulate, AlwaysCooperate, AlwaysDefect, Choice, GrimTrigger, Grudger,
    MatchParams, MatchRecord, RepeatedGame, RoundOutcome, Strategy, StrategyKind, TitForTat,
};
