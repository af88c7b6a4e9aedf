//! Outcome of an auction for one realized profile of valuations

use econ_core::{output, Result, SolverError, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bidding::equilibrium_bid;
use crate::params::{AuctionFormat, AuctionParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedOutcome {
    pub format: AuctionFormat,
    pub valuations: Vec<f64>,
    /// Equilibrium bid of each bidder; `None` for bidders priced out by the reserve
    pub bids: Vec<Option<f64>>,
    /// Index of the winning bidder, `None` when the item goes unsold
    pub winner: Option<usize>,
    pub payment: f64,
    pub winner_surplus: f64,
    /// Whether the item went to a bidder with the highest valuation
    pub efficient: bool,
}

impl RealizedOutcome {
    pub fn sold(&self) -> bool {
        self.winner.is_some()
    }

    pub fn highest_valuation(&self) -> f64 {
        self.valuations.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(self.winner_surplus, self.payment, self.highest_valuation())
    }
}

/// Highest bid with ties broken toward the lowest index, plus the runner-up bid
fn rank_bids(bids: &[Option<f64>]) -> Option<(usize, f64, Option<f64>)> {
    let mut best: Option<(usize, f64)> = None;
    let mut second: Option<f64> = None;
    for (i, bid) in bids.iter().enumerate() {
        let Some(bid) = *bid else { continue };
        match best {
            Some((_, top)) if bid <= top => {
                if second.is_none_or(|s| bid > s) {
                    second = Some(bid);
                }
            }
            Some((_, top)) => {
                second = Some(top);
                best = Some((i, bid));
            }
            None => best = Some((i, bid)),
        }
    }
    best.map(|(i, top)| (i, top, second))
}

/// Play the auction in `params` on its realized `valuations`
pub fn realize(params: &AuctionParams) -> Result<RealizedOutcome> {
    params.validate()?;
    let valuations = params
        .valuations
        .clone()
        .ok_or_else(|| SolverError::invalid("valuations", "a realized outcome needs one value per bidder"))?;

    let bids = valuations
        .iter()
        .map(|v| equilibrium_bid(params, *v))
        .collect::<Result<Vec<_>>>()?;

    let Some((winner, top_bid, runner_up)) = rank_bids(&bids) else {
        debug!(format = %params.format, "no bid clears the reserve; item unsold");
        return Ok(RealizedOutcome {
            format: params.format,
            valuations,
            bids,
            winner: None,
            payment: 0.0,
            winner_surplus: 0.0,
            efficient: false,
        });
    };

    let winner_value = valuations[winner];
    let payment = match params.format {
        AuctionFormat::FirstPrice | AuctionFormat::Dutch => top_bid,
        AuctionFormat::SecondPrice => runner_up.unwrap_or(0.0).max(params.reserve_price),
        // The clock stops one step above the last rival to drop out
        AuctionFormat::English => match runner_up {
            Some(rival) => (rival + params.bid_increment).min(winner_value).max(params.reserve_price),
            None => params.reserve_price,
        },
    };
    let payment = output("payment", payment)?;
    let highest = valuations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let outcome = RealizedOutcome {
        format: params.format,
        winner: Some(winner),
        payment,
        winner_surplus: output("winner_surplus", winner_value - payment)?,
        efficient: winner_value >= highest,
        valuations,
        bids,
    };
    debug!(
        format = %params.format,
        winner,
        payment,
        efficient = outcome.efficient,
        "auction realized"
    );
    Ok(outcome)
}
