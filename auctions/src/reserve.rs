//! Revenue-maximising reserve price
//!
//! A seller who keeps the item at value v₀ when it goes unsold sets the
//! reserve where the marginal bidder's virtual value v - (1 - F(v))/f(v)
//! equals v₀. For uniform values the virtual value is 2v - high, so
//!
//! ```text
//! r* = (high + v₀) / 2
//! ```
//!
//! independent of the number of bidders and of the format. A reserve at or
//! below the bottom of the support never binds, so r* is floored at `low`.

use econ_core::{below, non_negative, output, Result, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bidding::unit_power;
use crate::params::{AuctionFormat, AuctionParams, ValuationDistribution};
use crate::revenue::{expected_revenue, ExpectedRevenue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveParams {
    pub format: AuctionFormat,
    pub num_bidders: usize,
    pub distribution: ValuationDistribution,
    /// Seller's own value for the item, in [0, high)
    #[serde(default)]
    pub seller_value: f64,
}

impl ReserveParams {
    pub fn validate(&self) -> Result<()> {
        self.auction(0.0).validate()?;
        non_negative("seller_value", self.seller_value)?;
        below(
            "seller_value",
            self.seller_value,
            self.distribution.high(),
            "distribution.high",
        )?;
        Ok(())
    }

    fn auction(&self, reserve_price: f64) -> AuctionParams {
        AuctionParams {
            format: self.format,
            num_bidders: self.num_bidders,
            distribution: self.distribution,
            reserve_price,
            valuations: None,
            bid_increment: 0.0,
        }
    }

    /// E[max(v₀, highest value)]: the item always goes to whoever values it most
    fn efficient_surplus(&self) -> f64 {
        let dist = self.distribution;
        let n = self.num_bidders as f64;
        let s = dist.normalize(self.seller_value).clamp(0.0, 1.0);
        let s_n1 = unit_power(s, self.num_bidders + 1);
        dist.low() + dist.width() * (s_n1 + n * (1.0 - s_n1) / (n + 1.0))
    }
}

impl Default for ReserveParams {
    /// Two bidders with values uniform on [0, 1] and a seller who values the item at 0
    fn default() -> Self {
        ReserveParams {
            format: AuctionFormat::SecondPrice,
            num_bidders: 2,
            distribution: ValuationDistribution::Uniform { low: 0.0, high: 1.0 },
            seller_value: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveOutcome {
    pub reserve_price: f64,
    pub with_reserve: ExpectedRevenue,
    pub without_reserve: ExpectedRevenue,
    /// Expected revenue plus the seller's value when the item goes unsold
    pub seller_payoff: f64,
    /// Seller payoff with no reserve, where the item always sells
    pub baseline_payoff: f64,
    pub efficient_surplus: f64,
}

impl ReserveOutcome {
    pub fn payoff_gain(&self) -> f64 {
        self.seller_payoff - self.baseline_payoff
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(
            self.with_reserve.bidder_surplus(),
            self.seller_payoff,
            self.efficient_surplus,
        )
    }
}

/// Expected seller payoff when the seller posts `reserve_price`
pub fn seller_payoff(params: &ReserveParams, reserve_price: f64) -> Result<f64> {
    params.validate()?;
    let revenue = expected_revenue(&params.auction(reserve_price))?;
    Ok(revenue.revenue + params.seller_value * (1.0 - revenue.sale_probability))
}

pub fn optimal_reserve(params: &ReserveParams) -> Result<ReserveOutcome> {
    params.validate()?;
    let dist = params.distribution;
    let reserve_price = output(
        "reserve_price",
        ((dist.high() + params.seller_value) / 2.0).max(dist.low()),
    )?;

    let with_reserve = expected_revenue(&params.auction(reserve_price))?;
    let without_reserve = expected_revenue(&params.auction(0.0))?;
    let unsold = 1.0 - with_reserve.sale_probability;
    let outcome = ReserveOutcome {
        reserve_price,
        seller_payoff: output(
            "seller_payoff",
            with_reserve.revenue + params.seller_value * unsold,
        )?,
        baseline_payoff: without_reserve.revenue,
        efficient_surplus: output("efficient_surplus", params.efficient_surplus())?,
        with_reserve,
        without_reserve,
    };
    debug!(
        reserve_price,
        gain = outcome.payoff_gain(),
        "optimal reserve price"
    );
    Ok(outcome)
}
