//! Symmetric equilibrium bidding strategies
//!
//! In second-price and English auctions bidding one's value is weakly
//! dominant. In first-price and Dutch auctions a bidder with value v shades
//! to the expected highest rival value given that v wins. On the unit scale
//! x = (v - low)/(high - low) with normalized reserve ρ this is
//!
//! ```text
//! β(x) = x - (xⁿ - ρⁿ) / (n·xⁿ⁻¹)
//! ```
//!
//! which reduces to x·(n - 1)/n without a reserve. It is evaluated as
//! x·(n - 1)/n + ρ·(ρ/x)ⁿ⁻¹/n so that xⁿ⁻¹ never underflows into a division.

use econ_core::{finite, output, Result, SolverError};

use crate::params::{AuctionFormat, AuctionParams};

/// Bid as a fraction of value without a reserve, on a support starting at 0
///
/// # Examples
///
/// ```
/// use auctions::{bid_factor, AuctionFormat};
///
/// assert_eq!(bid_factor(AuctionFormat::FirstPrice, 4), 0.75);
/// assert_eq!(bid_factor(AuctionFormat::SecondPrice, 4), 1.0);
/// ```
pub fn bid_factor(format: AuctionFormat, num_bidders: usize) -> f64 {
    if format.pays_own_bid() {
        let n = num_bidders as f64;
        (n - 1.0) / n
    } else {
        1.0
    }
}

/// `x` raised to a bidder-count exponent
pub(crate) fn unit_power(x: f64, exponent: usize) -> f64 {
    match i32::try_from(exponent) {
        Ok(k) => x.powi(k),
        Err(_) => x.powf(exponent as f64),
    }
}

/// Shaded bid on the unit scale, for `x` at or above the reserve
pub(crate) fn shaded_unit_bid(x: f64, reserve: f64, n: usize) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let n_f = n as f64;
    x * (n_f - 1.0) / n_f + reserve * unit_power(reserve / x, n.saturating_sub(1)) / n_f
}

/// Equilibrium bid of a bidder with the given value
///
/// Returns `None` for a value below the reserve price: that bidder stays out.
pub fn equilibrium_bid(params: &AuctionParams, value: f64) -> Result<Option<f64>> {
    finite("value", value)?;
    let dist = params.distribution;
    if value < dist.low() || value > dist.high() {
        return Err(SolverError::invalid(
            "value",
            format!("must lie in the support [{}, {}]", dist.low(), dist.high()),
        ));
    }
    if value < params.reserve_price {
        return Ok(None);
    }
    if !params.format.pays_own_bid() {
        return Ok(Some(value));
    }

    let x = dist.normalize(value);
    let unit = shaded_unit_bid(x, params.normalized_reserve(), params.num_bidders);
    let bid = output("bid", dist.low() + dist.width() * unit)?;
    Ok(Some(bid))
}
