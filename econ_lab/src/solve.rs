//! Dispatch from a model tag to its solver

use auctions::{optimal_reserve, solve_auction};
use differentiation::{hotelling, salop, vertical};
use econ_core::{IterationOptions, Result, SolverError, WelfareMetrics};
use game_theory::{analyze, grim_trigger, investment_decision};
use market_structure::{
    bertrand_differentiated, bertrand_homogeneous, compare_market_structures, cournot, cournot_duopoly,
    monopolistic_competition, monopoly, perfect_competition, stackelberg,
};
use network_effects::{adoption, platform_competition, two_sided_platform};
use tracing::debug;

use crate::model::{Model, ParameterSet};
use crate::result::EquilibriumResult;

/// Solve `model` on `params` with the default iteration controls
///
/// The tag must match the parameter set; a mismatch is `Unsupported`.
///
/// # Examples
///
/// ```
/// use econ_lab::{solve, Model, ParameterSet};
///
/// let result = solve(Model::Monopoly, &ParameterSet::preset(Model::Monopoly)).unwrap();
/// assert_eq!(result.output("market_quantity"), Some(40.0));
/// assert_eq!(result.output("price"), Some(60.0));
/// ```
pub fn solve(model: Model, params: &ParameterSet) -> Result<EquilibriumResult> {
    solve_with(model, params, &IterationOptions::default())
}

pub fn solve_with(model: Model, params: &ParameterSet, options: &IterationOptions) -> Result<EquilibriumResult> {
    if params.model() != model {
        return Err(SolverError::unsupported(format!(
            "model `{}` cannot be solved with `{}` parameters",
            model,
            params.model()
        )));
    }
    debug!(%model, "solving");

    let result = match params {
        ParameterSet::PerfectCompetition(p) => EquilibriumResult::PerfectCompetition(perfect_competition(p)?),
        ParameterSet::Monopoly(p) => EquilibriumResult::Monopoly(monopoly(p)?),
        ParameterSet::Cournot(p) => EquilibriumResult::Cournot(cournot(p)?),
        ParameterSet::Bertrand(p) => EquilibriumResult::Bertrand(bertrand_homogeneous(p)?),
        ParameterSet::MarketComparison(p) => {
            EquilibriumResult::MarketComparison(compare_market_structures(p)?)
        }
        ParameterSet::CournotDuopoly(p) => EquilibriumResult::CournotDuopoly(cournot_duopoly(p)?),
        ParameterSet::Stackelberg(p) => EquilibriumResult::Stackelberg(stackelberg(p)?),
        ParameterSet::DifferentiatedBertrand(p) => {
            EquilibriumResult::DifferentiatedBertrand(bertrand_differentiated(p)?)
        }
        ParameterSet::MonopolisticCompetition(p) => {
            EquilibriumResult::MonopolisticCompetition(monopolistic_competition(p, options)?)
        }
        ParameterSet::NormalFormGame(matrix) => EquilibriumResult::NormalFormGame(analyze(matrix)?),
        ParameterSet::EntryGame(p) => EquilibriumResult::EntryGame(analyze(&p.matrix()?)?),
        ParameterSet::GrimTrigger(game) => EquilibriumResult::GrimTrigger(grim_trigger(game)?),
        ParameterSet::StrategyMatch(p) => EquilibriumResult::StrategyMatch(p.play()?),
        ParameterSet::Investment(p) => EquilibriumResult::Investment(investment_decision(p)?),
        ParameterSet::Hotelling(p) => EquilibriumResult::Hotelling(hotelling(p)?),
        ParameterSet::Salop(p) => EquilibriumResult::Salop(salop(p, options)?),
        ParameterSet::VerticalDifferentiation(p) => EquilibriumResult::VerticalDifferentiation(vertical(p)?),
        ParameterSet::Auction(p) => EquilibriumResult::Auction(solve_auction(p)?),
        ParameterSet::OptimalReserve(p) => EquilibriumResult::OptimalReserve(optimal_reserve(p)?),
        ParameterSet::NetworkAdoption(p) => EquilibriumResult::NetworkAdoption(adoption(p, options)?),
        ParameterSet::PlatformCompetition(p) => {
            EquilibriumResult::PlatformCompetition(platform_competition(p)?)
        }
        ParameterSet::TwoSidedPlatform(p) => EquilibriumResult::TwoSidedPlatform(two_sided_platform(p)?),
    };
    Ok(result)
}

/// Welfare record of any equilibrium result
pub fn welfare(result: &EquilibriumResult) -> WelfareMetrics {
    result.welfare()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_solves() {
        for model in Model::ALL {
            let result = solve(model, &ParameterSet::preset(model));
            let result = result.unwrap_or_else(|e| panic!("{} failed: {}", model, e));
            assert_eq!(result.model(), model);
            assert!(welfare(&result).is_consistent(), "{}", model);
            assert!(!result.outputs().is_empty());
        }
    }

    #[test]
    fn mismatched_tag_is_unsupported() {
        let err = solve(Model::Cournot, &ParameterSet::preset(Model::Monopoly)).unwrap_err();
        assert_eq!(err.kind(), "unsupported");
    }

    #[test]
    fn invalid_parameters_surface_unchanged() {
        let params = ParameterSet::preset(Model::Monopoly)
            .with_parameter("marginal_cost", 150.0)
            .unwrap();
        let err = solve(Model::Monopoly, &params).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
    }
}
