//! Infinitely repeated prisoner's dilemma
//!
//! Grim trigger sustains cooperation when the discounted value of
//! cooperating forever is at least the one-shot temptation followed by
//! punishment forever. The strategy simulation plays finite matches between
//! history-dependent rules.

use std::fmt;

use econ_core::{at_least, finite, in_range, output, Result, SolverError, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matrix::{prisoners_dilemma, PayoffMatrix};

// ============================================================================
// Stage game
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepeatedGame {
    /// Payoff to mutual cooperation (R)
    pub reward: f64,
    /// Payoff to defecting on a cooperator (T)
    pub temptation: f64,
    /// Payoff to mutual defection (P)
    pub punishment: f64,
    /// Payoff to cooperating with a defector (S)
    pub sucker: f64,
    /// Per-period discount factor δ in [0, 1)
    pub discount: f64,
}

impl RepeatedGame {
    pub fn validate(&self) -> Result<()> {
        finite("reward", self.reward)?;
        finite("temptation", self.temptation)?;
        finite("punishment", self.punishment)?;
        finite("sucker", self.sucker)?;
        in_range("discount", self.discount, 0.0, 1.0)?;
        if self.discount >= 1.0 {
            return Err(SolverError::invalid("discount", "must be below 1"));
        }
        if self.temptation <= self.reward {
            return Err(SolverError::invalid("temptation", "must exceed reward"));
        }
        if self.reward <= self.punishment {
            return Err(SolverError::invalid("reward", "must exceed punishment"));
        }
        Ok(())
    }

    pub fn stage_game(&self) -> Result<PayoffMatrix> {
        prisoners_dilemma(self.reward, self.temptation, self.punishment, self.sucker)
    }

    /// Stage payoff to a player choosing `mine` against `theirs`
    pub fn payoff(&self, mine: Choice, theirs: Choice) -> f64 {
        match (mine, theirs) {
            (Choice::Cooperate, Choice::Cooperate) => self.reward,
            (Choice::Defect, Choice::Cooperate) => self.temptation,
            (Choice::Cooperate, Choice::Defect) => self.sucker,
            (Choice::Defect, Choice::Defect) => self.punishment,
        }
    }
}

impl Default for RepeatedGame {
    fn default() -> Self {
        RepeatedGame {
            reward: 3.0,
            temptation: 5.0,
            punishment: 1.0,
            sucker: 0.0,
            discount: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrimTrigger {
    /// R / (1 - δ)
    pub cooperation_value: f64,
    /// T + δP / (1 - δ)
    pub defection_value: f64,
    /// P / (1 - δ), mutual defection forever
    pub punishment_value: f64,
    pub sustainable: bool,
    /// Smallest discount factor that sustains cooperation, (T - R)/(T - P)
    pub threshold_discount: f64,
}

impl GrimTrigger {
    /// Present-value gain from cooperating rather than deviating
    pub fn cooperation_premium(&self) -> f64 {
        self.cooperation_value - self.defection_value
    }

    /// Joint present value of the pair against permanent cooperation
    pub fn welfare(&self) -> WelfareMetrics {
        let per_player = if self.sustainable {
            self.cooperation_value
        } else {
            self.punishment_value
        };
        WelfareMetrics::from_surplus(0.0, 2.0 * per_player, 2.0 * self.cooperation_value)
    }
}

pub fn grim_trigger(game: &RepeatedGame) -> Result<GrimTrigger> {
    game.validate()?;
    let RepeatedGame {
        reward: r,
        temptation: t,
        punishment: p,
        discount: d,
        ..
    } = *game;

    let cooperation_value = output("cooperation_value", r / (1.0 - d))?;
    let defection_value = output("defection_value", t + d * p / (1.0 - d))?;
    let result = GrimTrigger {
        cooperation_value,
        defection_value,
        punishment_value: output("punishment_value", p / (1.0 - d))?,
        sustainable: cooperation_value >= defection_value,
        threshold_discount: output("threshold_discount", (t - r) / (t - p))?,
    };
    debug!(
        discount = d,
        threshold = result.threshold_discount,
        sustainable = result.sustainable,
        "grim trigger"
    );
    Ok(result)
}

// ============================================================================
// Strategies
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Choice {
    Cooperate,
    Defect,
}

/// One completed round from a player's point of view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round_number: usize,
    pub my_choice: Choice,
    pub opponent_choice: Choice,
    pub my_payoff: f64,
}

pub trait Strategy {
    fn decide(&self, history: &[RoundOutcome]) -> Choice;
    fn name(&self) -> &'static str;
}

/// Cooperate first, then copy the opponent's last move
pub struct TitForTat;

impl Strategy for TitForTat {
    fn decide(&self, history: &[RoundOutcome]) -> Choice {
        history
            .last()
            .map(|r| r.opponent_choice)
            .unwrap_or(Choice::Cooperate)
    }

    fn name(&self) -> &'static str {
        "TitForTat"
    }
}

/// Cooperate until the opponent defects once
pub struct Grudger;

impl Strategy for Grudger {
    fn decide(&self, history: &[RoundOutcome]) -> Choice {
        if history.iter().any(|r| r.opponent_choice == Choice::Defect) {
            Choice::Defect
        } else {
            Choice::Cooperate
        }
    }

    fn name(&self) -> &'static str {
        "Grudger"
    }
}

pub struct AlwaysCooperate;

impl Strategy for AlwaysCooperate {
    fn decide(&self, _history: &[RoundOutcome]) -> Choice {
        Choice::Cooperate
    }

    fn name(&self) -> &'static str {
        "AlwaysCooperate"
    }
}

pub struct AlwaysDefect;

impl Strategy for AlwaysDefect {
    fn decide(&self, _history: &[RoundOutcome]) -> Choice {
        Choice::Defect
    }

    fn name(&self) -> &'static str {
        "AlwaysDefect"
    }
}

/// Serializable name of a built-in strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    TitForTat,
    Grudger,
    AlwaysCooperate,
    AlwaysDefect,
}

impl StrategyKind {
    pub fn strategy(&self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::TitForTat => Box::new(TitForTat),
            StrategyKind::Grudger => Box::new(Grudger),
            StrategyKind::AlwaysCooperate => Box::new(AlwaysCooperate),
            StrategyKind::AlwaysDefect => Box::new(AlwaysDefect),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.strategy().name())
    }
}

// ============================================================================
// Match simulation
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player_a: String,
    pub player_b: String,
    /// Rounds from player A's point of view
    pub history_a: Vec<RoundOutcome>,
    /// Rounds from player B's point of view
    pub history_b: Vec<RoundOutcome>,
    pub total_a: f64,
    pub total_b: f64,
    /// Joint payoff had both cooperated every round
    pub cooperative_total: f64,
}

impl MatchRecord {
    fn cooperation_rate(history: &[RoundOutcome]) -> f64 {
        if history.is_empty() {
            return 0.0;
        }
        let cooperations = history
            .iter()
            .filter(|r| r.my_choice == Choice::Cooperate)
            .count();
        cooperations as f64 / history.len() as f64
    }

    pub fn cooperation_rate_a(&self) -> f64 {
        Self::cooperation_rate(&self.history_a)
    }

    pub fn cooperation_rate_b(&self) -> f64 {
        Self::cooperation_rate(&self.history_b)
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(0.0, self.total_a + self.total_b, self.cooperative_total)
    }
}

/// A finite match between two built-in strategies
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchParams {
    pub game: RepeatedGame,
    pub player_a: StrategyKind,
    pub player_b: StrategyKind,
    pub rounds: usize,
}

impl MatchParams {
    pub fn play(&self) -> Result<MatchRecord> {
        let a = self.player_a.strategy();
        let b = self.player_b.strategy();
        simulate(&self.game, a.as_ref(), b.as_ref(), self.rounds)
    }
}

impl Default for MatchParams {
    fn default() -> Self {
        MatchParams {
            game: RepeatedGame::default(),
            player_a: StrategyKind::TitForTat,
            player_b: StrategyKind::AlwaysDefect,
            rounds: 10,
        }
    }
}

/// Play `rounds` rounds of the stage game between two strategies
pub fn simulate(game: &RepeatedGame, a: &dyn Strategy, b: &dyn Strategy, rounds: usize) -> Result<MatchRecord> {
    game.validate()?;
    at_least("rounds", rounds, 1)?;

    let mut history_a: Vec<RoundOutcome> = Vec::with_capacity(rounds);
    let mut history_b: Vec<RoundOutcome> = Vec::with_capacity(rounds);

    for round_number in 0..rounds {
        let choice_a = a.decide(&history_a);
        let choice_b = b.decide(&history_b);
        history_a.push(RoundOutcome {
            round_number,
            my_choice: choice_a,
            opponent_choice: choice_b,
            my_payoff: game.payoff(choice_a, choice_b),
        });
        history_b.push(RoundOutcome {
            round_number,
            my_choice: choice_b,
            opponent_choice: choice_a,
            my_payoff: game.payoff(choice_b, choice_a),
        });
    }

    let record = MatchRecord {
        player_a: a.name().to_string(),
        player_b: b.name().to_string(),
        total_a: history_a.iter().map(|r| r.my_payoff).sum(),
        total_b: history_b.iter().map(|r| r.my_payoff).sum(),
        cooperative_total: 2.0 * game.reward * rounds as f64,
        history_a,
        history_b,
    };
    debug!(
        player_a = %record.player_a,
        player_b = %record.player_b,
        total_a = record.total_a,
        total_b = record.total_b,
        "match complete"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn patient_players_sustain_cooperation() {
        let result = grim_trigger(&RepeatedGame::default()).unwrap();
        assert_relative_eq!(result.threshold_discount, 0.5);
        assert_relative_eq!(result.cooperation_value, 30.0, epsilon = 1e-9);
        assert_relative_eq!(result.defection_value, 14.0, epsilon = 1e-9);
        assert!(result.sustainable);
    }

    #[test]
    fn impatient_players_defect() {
        let game = RepeatedGame {
            discount: 0.3,
            ..RepeatedGame::default()
        };
        let result = grim_trigger(&game).unwrap();
        assert!(!result.sustainable);
        assert!(result.cooperation_premium() < 0.0);
    }

    #[test]
    fn threshold_is_the_break_even_discount() {
        let game = RepeatedGame {
            discount: 0.5,
            ..RepeatedGame::default()
        };
        let result = grim_trigger(&game).unwrap();
        assert_relative_eq!(result.cooperation_value, result.defection_value, epsilon = 1e-12);
        assert!(result.sustainable);
    }

    #[test]
    fn payoff_ordering_is_enforced() {
        let game = RepeatedGame {
            temptation: 2.0,
            ..RepeatedGame::default()
        };
        assert_eq!(grim_trigger(&game).unwrap_err().kind(), "invalid-parameter");

        let game = RepeatedGame {
            discount: 1.0,
            ..RepeatedGame::default()
        };
        assert!(grim_trigger(&game).is_err());
    }

    #[test]
    fn tit_for_tat_is_exploited_once() {
        let record = simulate(&RepeatedGame::default(), &TitForTat, &AlwaysDefect, 10).unwrap();
        // S then nine rounds of P against T then nine rounds of P
        assert_eq!(record.total_a, 9.0);
        assert_eq!(record.total_b, 14.0);
        assert_eq!(record.history_a[1].my_choice, Choice::Defect);
        assert_relative_eq!(record.cooperation_rate_a(), 0.1);
    }

    #[test]
    fn nice_strategies_cooperate_throughout() {
        let record = simulate(&RepeatedGame::default(), &Grudger, &TitForTat, 20).unwrap();
        assert_eq!(record.total_a, 60.0);
        assert_eq!(record.cooperation_rate_b(), 1.0);
    }

    #[test]
    fn strategy_kinds_resolve() {
        assert_eq!(StrategyKind::AlwaysCooperate.to_string(), "AlwaysCooperate");
        let s = StrategyKind::Grudger.strategy();
        assert_eq!(s.decide(&[]), Choice::Cooperate);
    }

    #[test]
    fn broken_cooperation_loses_joint_value() {
        let game = RepeatedGame {
            discount: 0.3,
            ..RepeatedGame::default()
        };
        let w = grim_trigger(&game).unwrap().welfare();
        // 2P/(1 - δ) against 2R/(1 - δ)
        assert_relative_eq!(w.efficiency_ratio, 1.0 / 3.0, epsilon = 1e-12);
        assert!(w.deadweight_loss > 0.0);
    }

    #[test]
    fn match_params_play_the_named_strategies() {
        let record = MatchParams::default().play().unwrap();
        assert_eq!(record.player_a, "TitForTat");
        assert_eq!(record.player_b, "AlwaysDefect");
        assert_eq!(record.cooperative_total, 60.0);
        assert_relative_eq!(record.welfare().producer_surplus, 23.0);
    }
}
