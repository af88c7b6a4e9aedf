//! Single-item auctions with independent private values
//!
//! Bidders draw values from a common uniform distribution. For each of the
//! four standard formats this crate provides
//!
//! - the symmetric equilibrium bid (`equilibrium_bid`, `bid_factor`),
//! - the seller's expected revenue (`expected_revenue`, `compare_formats`),
//! - the outcome on a realized valuation profile (`realize`),
//! - a seeded Monte Carlo estimate of revenue (`simulate_revenue`),
//! - the seller's revenue-maximising reserve price (`optimal_reserve`).
//!
//! With a common reserve price every format yields the same expected revenue.

pub mod bidding;
pub mod monte_carlo;
pub mod outcome;
pub mod params;
pub mod reserve;
pub mod revenue;

pub use bidding::{bid_factor, equilibrium_bid};
pub use monte_carlo::{simulate_revenue, MonteCarloEstimate};
pub use outcome::{realize, RealizedOutcome};
pub use params::{AuctionFormat, AuctionParams, ValuationDistribution, MAX_BIDDERS};
pub use reserve::{optimal_reserve, seller_payoff, ReserveOutcome, ReserveParams};
pub use revenue::{compare_formats, expected_revenue, ExpectedRevenue};

use econ_core::{Result, WelfareMetrics};
use serde::{Deserialize, Serialize};

/// Everything known about one auction: bidding rule, ex-ante revenue and,
/// when valuations were supplied, the realized outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionOutcome {
    pub format: AuctionFormat,
    pub num_bidders: usize,
    pub bid_factor: f64,
    pub expected: ExpectedRevenue,
    pub realized: Option<RealizedOutcome>,
}

impl AuctionOutcome {
    /// Realized welfare when valuations are known, ex-ante otherwise
    pub fn welfare(&self) -> WelfareMetrics {
        match &self.realized {
            Some(realized) => realized.welfare(),
            None => self.expected.welfare(),
        }
    }
}

pub fn solve_auction(params: &AuctionParams) -> Result<AuctionOutcome> {
    let expected = expected_revenue(params)?;
    let realized = match params.valuations {
        Some(_) => Some(realize(params)?),
        None => None,
    };
    Ok(AuctionOutcome {
        format: params.format,
        num_bidders: params.num_bidders,
        bid_factor: bid_factor(params.format, params.num_bidders),
        expected,
        realized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn outcome_without_valuations_reports_expected_welfare() {
        let outcome = solve_auction(&AuctionParams::default()).unwrap();
        assert!(outcome.realized.is_none());
        assert_eq!(outcome.bid_factor, 0.75);
        assert_relative_eq!(outcome.welfare().producer_surplus, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn outcome_with_valuations_reports_realized_welfare() {
        let params = AuctionParams {
            format: AuctionFormat::SecondPrice,
            num_bidders: 2,
            valuations: Some(vec![0.4, 0.7]),
            ..AuctionParams::default()
        };
        let outcome = solve_auction(&params).unwrap();
        let w = outcome.welfare();
        assert_relative_eq!(w.producer_surplus, 0.4, epsilon = 1e-12);
        assert_relative_eq!(w.consumer_surplus, 0.3, epsilon = 1e-12);
        assert!(w.is_consistent());
    }
}
