//! Model tags and the parameter sets they are solved with

use std::fmt;

use auctions::{AuctionParams, ReserveParams};
use differentiation::{HotellingParams, SalopEntry, SalopParams, VerticalParams};
use econ_core::{finite, Result, SolverError};
use game_theory::{EntryGameParams, InvestmentParams, MatchParams, PayoffMatrix, RepeatedGame};
use market_structure::{
    DifferentiatedParams, DuopolyParams, EntryParams, MarketParams, StackelbergParams,
};
use network_effects::{AdoptionParams, CompetitionParams, PlatformParams};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Every model the workspace can solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Model {
    PerfectCompetition,
    Monopoly,
    Cournot,
    Bertrand,
    MarketComparison,
    CournotDuopoly,
    Stackelberg,
    DifferentiatedBertrand,
    MonopolisticCompetition,
    NormalFormGame,
    EntryGame,
    GrimTrigger,
    StrategyMatch,
    Investment,
    Hotelling,
    Salop,
    VerticalDifferentiation,
    Auction,
    OptimalReserve,
    NetworkAdoption,
    PlatformCompetition,
    TwoSidedPlatform,
}

impl Model {
    pub const ALL: [Model; 22] = [
        Model::PerfectCompetition,
        Model::Monopoly,
        Model::Cournot,
        Model::Bertrand,
        Model::MarketComparison,
        Model::CournotDuopoly,
        Model::Stackelberg,
        Model::DifferentiatedBertrand,
        Model::MonopolisticCompetition,
        Model::NormalFormGame,
        Model::EntryGame,
        Model::GrimTrigger,
        Model::StrategyMatch,
        Model::Investment,
        Model::Hotelling,
        Model::Salop,
        Model::VerticalDifferentiation,
        Model::Auction,
        Model::OptimalReserve,
        Model::NetworkAdoption,
        Model::PlatformCompetition,
        Model::TwoSidedPlatform,
    ];

    /// The kebab-case tag used in scenario files
    pub fn tag(&self) -> &'static str {
        match self {
            Model::PerfectCompetition => "perfect-competition",
            Model::Monopoly => "monopoly",
            Model::Cournot => "cournot",
            Model::Bertrand => "bertrand",
            Model::MarketComparison => "market-comparison",
            Model::CournotDuopoly => "cournot-duopoly",
            Model::Stackelberg => "stackelberg",
            Model::DifferentiatedBertrand => "differentiated-bertrand",
            Model::MonopolisticCompetition => "monopolistic-competition",
            Model::NormalFormGame => "normal-form-game",
            Model::EntryGame => "entry-game",
            Model::GrimTrigger => "grim-trigger",
            Model::StrategyMatch => "strategy-match",
            Model::Investment => "investment",
            Model::Hotelling => "hotelling",
            Model::Salop => "salop",
            Model::VerticalDifferentiation => "vertical-differentiation",
            Model::Auction => "auction",
            Model::OptimalReserve => "optimal-reserve",
            Model::NetworkAdoption => "network-adoption",
            Model::PlatformCompetition => "platform-competition",
            Model::TwoSidedPlatform => "two-sided-platform",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parameters of one solve, tagged with the model they belong to
///
/// In TOML and JSON the tag travels as a `model` key next to the fields:
///
/// ```
/// use econ_lab::{Model, ParameterSet};
///
/// let params: ParameterSet = toml::from_str(r#"
///     model = "cournot"
///     demand = { intercept = 100.0, slope = 1.0 }
///     marginal_cost = 20.0
///     num_firms = 2
/// "#).unwrap();
/// assert_eq!(params.model(), Model::Cournot);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum ParameterSet {
    PerfectCompetition(MarketParams),
    Monopoly(MarketParams),
    Cournot(MarketParams),
    Bertrand(MarketParams),
    MarketComparison(MarketParams),
    CournotDuopoly(DuopolyParams),
    Stackelberg(StackelbergParams),
    DifferentiatedBertrand(DifferentiatedParams),
    MonopolisticCompetition(EntryParams),
    NormalFormGame(PayoffMatrix),
    EntryGame(EntryGameParams),
    GrimTrigger(RepeatedGame),
    StrategyMatch(MatchParams),
    Investment(InvestmentParams),
    Hotelling(HotellingParams),
    Salop(SalopParams),
    VerticalDifferentiation(VerticalParams),
    Auction(AuctionParams),
    OptimalReserve(ReserveParams),
    NetworkAdoption(AdoptionParams),
    PlatformCompetition(CompetitionParams),
    TwoSidedPlatform(PlatformParams),
}

impl ParameterSet {
    pub fn model(&self) -> Model {
        match self {
            ParameterSet::PerfectCompetition(_) => Model::PerfectCompetition,
            ParameterSet::Monopoly(_) => Model::Monopoly,
            ParameterSet::Cournot(_) => Model::Cournot,
            ParameterSet::Bertrand(_) => Model::Bertrand,
            ParameterSet::MarketComparison(_) => Model::MarketComparison,
            ParameterSet::CournotDuopoly(_) => Model::CournotDuopoly,
            ParameterSet::Stackelberg(_) => Model::Stackelberg,
            ParameterSet::DifferentiatedBertrand(_) => Model::DifferentiatedBertrand,
            ParameterSet::MonopolisticCompetition(_) => Model::MonopolisticCompetition,
            ParameterSet::NormalFormGame(_) => Model::NormalFormGame,
            ParameterSet::EntryGame(_) => Model::EntryGame,
            ParameterSet::GrimTrigger(_) => Model::GrimTrigger,
            ParameterSet::StrategyMatch(_) => Model::StrategyMatch,
            ParameterSet::Investment(_) => Model::Investment,
            ParameterSet::Hotelling(_) => Model::Hotelling,
            ParameterSet::Salop(_) => Model::Salop,
            ParameterSet::VerticalDifferentiation(_) => Model::VerticalDifferentiation,
            ParameterSet::Auction(_) => Model::Auction,
            ParameterSet::OptimalReserve(_) => Model::OptimalReserve,
            ParameterSet::NetworkAdoption(_) => Model::NetworkAdoption,
            ParameterSet::PlatformCompetition(_) => Model::PlatformCompetition,
            ParameterSet::TwoSidedPlatform(_) => Model::TwoSidedPlatform,
        }
    }

    /// Classroom parameters for a model
    pub fn preset(model: Model) -> ParameterSet {
        match model {
            Model::PerfectCompetition => ParameterSet::PerfectCompetition(MarketParams::classroom(1)),
            Model::Monopoly => ParameterSet::Monopoly(MarketParams::classroom(1)),
            Model::Cournot => ParameterSet::Cournot(MarketParams::classroom(2)),
            Model::Bertrand => ParameterSet::Bertrand(MarketParams::classroom(2)),
            Model::MarketComparison => ParameterSet::MarketComparison(MarketParams::classroom(3)),
            Model::CournotDuopoly => ParameterSet::CournotDuopoly(DuopolyParams::default()),
            Model::Stackelberg => ParameterSet::Stackelberg(StackelbergParams::default()),
            Model::DifferentiatedBertrand => {
                ParameterSet::DifferentiatedBertrand(DifferentiatedParams::default())
            }
            Model::MonopolisticCompetition => {
                ParameterSet::MonopolisticCompetition(EntryParams::default())
            }
            Model::NormalFormGame => {
                let labels = vec!["Cooperate".to_string(), "Defect".to_string()];
                ParameterSet::NormalFormGame(PayoffMatrix {
                    row_labels: labels.clone(),
                    column_labels: labels,
                    row_payoffs: vec![vec![3.0, 0.0], vec![5.0, 1.0]],
                    column_payoffs: vec![vec![3.0, 5.0], vec![0.0, 1.0]],
                })
            }
            Model::EntryGame => ParameterSet::EntryGame(EntryGameParams::default()),
            Model::GrimTrigger => ParameterSet::GrimTrigger(RepeatedGame::default()),
            Model::StrategyMatch => ParameterSet::StrategyMatch(MatchParams::default()),
            Model::Investment => ParameterSet::Investment(InvestmentParams::default()),
            Model::Hotelling => ParameterSet::Hotelling(HotellingParams::default()),
            Model::Salop => ParameterSet::Salop(SalopParams {
                entry: SalopEntry::Free { max_firms: 1000 },
                ..SalopParams::default()
            }),
            Model::VerticalDifferentiation => {
                ParameterSet::VerticalDifferentiation(VerticalParams::default())
            }
            Model::Auction => ParameterSet::Auction(AuctionParams::default()),
            Model::OptimalReserve => ParameterSet::OptimalReserve(ReserveParams::default()),
            Model::NetworkAdoption => ParameterSet::NetworkAdoption(AdoptionParams::default()),
            Model::PlatformCompetition => {
                ParameterSet::PlatformCompetition(CompetitionParams::default())
            }
            Model::TwoSidedPlatform => ParameterSet::TwoSidedPlatform(PlatformParams::default()),
        }
    }

    /// Copy of these parameters with one numeric field replaced
    ///
    /// `path` is a dotted path into the parameter tree, with array elements
    /// addressed by index (`demand.intercept`, `marginal_costs.1`). Integer
    /// fields only accept whole non-negative values.
    pub fn with_parameter(&self, path: &str, value: f64) -> Result<ParameterSet> {
        finite(path, value)?;
        let mut tree = serde_json::to_value(self).map_err(|e| SolverError::invalid(path, e.to_string()))?;

        let mut slot = &mut tree;
        for segment in path.split('.') {
            slot = match slot {
                Value::Object(fields) => fields.get_mut(segment),
                Value::Array(items) => match segment.parse::<usize>() {
                    Ok(i) => items.get_mut(i),
                    Err(_) => None,
                },
                _ => None,
            }
            .ok_or_else(|| SolverError::invalid(path, format!("no parameter at `{}`", segment)))?;
        }

        let replacement = match &*slot {
            Value::Number(n) if n.is_u64() || n.is_i64() => {
                if value < 0.0 || value.fract() != 0.0 {
                    return Err(SolverError::invalid(path, "expects a whole non-negative number"));
                }
                Value::from(value as u64)
            }
            Value::Number(_) => Number::from_f64(value)
                .map(Value::Number)
                .ok_or_else(|| SolverError::invalid(path, "must be finite"))?,
            _ => return Err(SolverError::invalid(path, "is not a numeric parameter")),
        };
        *slot = replacement;

        serde_json::from_value(tree).map_err(|e| SolverError::invalid(path, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_carry_their_own_tag() {
        for model in Model::ALL {
            assert_eq!(ParameterSet::preset(model).model(), model);
        }
    }

    #[test]
    fn tag_matches_serde_name() {
        for model in Model::ALL {
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.tag()));
        }
    }

    #[test]
    fn with_parameter_updates_nested_and_indexed_fields() {
        let params = ParameterSet::preset(Model::CournotDuopoly);
        let updated = params.with_parameter("costs.1", 35.0).unwrap();
        match updated {
            ParameterSet::CournotDuopoly(p) => assert_eq!(p.costs, [20.0, 35.0]),
            other => panic!("unexpected {:?}", other),
        }

        let updated = ParameterSet::preset(Model::Monopoly)
            .with_parameter("demand.intercept", 120.0)
            .unwrap();
        match updated {
            ParameterSet::Monopoly(p) => assert_eq!(p.demand.intercept, 120.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn with_parameter_keeps_counts_integral() {
        let params = ParameterSet::preset(Model::Cournot);
        match params.with_parameter("num_firms", 5.0).unwrap() {
            ParameterSet::Cournot(p) => assert_eq!(p.num_firms, 5),
            other => panic!("unexpected {:?}", other),
        }
        assert!(params.with_parameter("num_firms", 2.5).is_err());
    }

    #[test]
    fn with_parameter_rejects_unknown_paths() {
        let params = ParameterSet::preset(Model::Cournot);
        let err = params.with_parameter("demand.elasticity", 1.0).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
        assert!(params.with_parameter("model", 1.0).is_err());
    }
}
