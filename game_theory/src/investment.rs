use econ_core::{finite, in_range, output, Result, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Capacity investment under demand uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentParams {
    pub investment_cost: f64,
    /// Probability of the high-demand state
    pub high_demand_probability: f64,
    pub high_demand_profit: f64,
    pub low_demand_profit: f64,
    /// Profit from staying with existing capacity
    pub no_invest_profit: f64,
}

impl InvestmentParams {
    pub fn validate(&self) -> Result<()> {
        finite("investment_cost", self.investment_cost)?;
        in_range("high_demand_probability", self.high_demand_probability, 0.0, 1.0)?;
        finite("high_demand_profit", self.high_demand_profit)?;
        finite("low_demand_profit", self.low_demand_profit)?;
        finite("no_invest_profit", self.no_invest_profit)?;
        Ok(())
    }
}

impl Default for InvestmentParams {
    fn default() -> Self {
        InvestmentParams {
            investment_cost: 50.0,
            high_demand_probability: 0.6,
            high_demand_profit: 150.0,
            low_demand_profit: 40.0,
            no_invest_profit: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentDecision {
    pub expected_invest_payoff: f64,
    pub no_invest_payoff: f64,
    /// Invest only when the expected payoff is strictly higher
    pub invest: bool,
}

impl InvestmentDecision {
    pub fn chosen_payoff(&self) -> f64 {
        if self.invest {
            self.expected_invest_payoff
        } else {
            self.no_invest_payoff
        }
    }

    /// The firm's own choice is the benchmark, so no surplus is lost
    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::efficient(0.0, self.chosen_payoff())
    }
}

pub fn investment_decision(params: &InvestmentParams) -> Result<InvestmentDecision> {
    params.validate()?;
    let p = params.high_demand_probability;
    let expected = p * params.high_demand_profit + (1.0 - p) * params.low_demand_profit
        - params.investment_cost;
    let decision = InvestmentDecision {
        expected_invest_payoff: output("expected_invest_payoff", expected)?,
        no_invest_payoff: params.no_invest_profit,
        invest: expected > params.no_invest_profit,
    };
    debug!(expected, invest = decision.invest, "investment decision");
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn favourable_odds_justify_investment() {
        let d = investment_decision(&InvestmentParams::default()).unwrap();
        // 0.6·150 + 0.4·40 - 50 = 56
        assert_abs_diff_eq!(d.expected_invest_payoff, 56.0, epsilon = 1e-9);
        assert!(d.invest);
        assert_abs_diff_eq!(d.chosen_payoff(), 56.0, epsilon = 1e-9);
    }

    #[test]
    fn probability_outside_unit_interval_is_invalid() {
        let params = InvestmentParams {
            high_demand_probability: 1.5,
            ..InvestmentParams::default()
        };
        assert!(investment_decision(&params).is_err());
    }
}
