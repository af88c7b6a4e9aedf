use std::fmt;

use econ_core::{at_least, finite, non_negative, Result, SolverError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuctionFormat {
    FirstPrice,
    SecondPrice,
    English,
    Dutch,
}

impl AuctionFormat {
    pub const ALL: [AuctionFormat; 4] = [
        AuctionFormat::FirstPrice,
        AuctionFormat::SecondPrice,
        AuctionFormat::English,
        AuctionFormat::Dutch,
    ];

    /// Whether the winner pays its own bid rather than the runner-up's
    pub fn pays_own_bid(&self) -> bool {
        matches!(self, AuctionFormat::FirstPrice | AuctionFormat::Dutch)
    }
}

impl fmt::Display for AuctionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionFormat::FirstPrice => write!(f, "First-Price Sealed-Bid"),
            AuctionFormat::SecondPrice => write!(f, "Second-Price Sealed-Bid"),
            AuctionFormat::English => write!(f, "English"),
            AuctionFormat::Dutch => write!(f, "Dutch"),
        }
    }
}

/// Independent private value distribution shared by every bidder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValuationDistribution {
    Uniform { low: f64, high: f64 },
}

impl ValuationDistribution {
    pub fn validate(&self) -> Result<()> {
        match *self {
            ValuationDistribution::Uniform { low, high } => {
                non_negative("distribution.low", low)?;
                finite("distribution.high", high)?;
                if high <= low {
                    return Err(SolverError::invalid(
                        "distribution.high",
                        "must exceed distribution.low",
                    ));
                }
                Ok(())
            }
        }
    }

    pub fn low(&self) -> f64 {
        match *self {
            ValuationDistribution::Uniform { low, .. } => low,
        }
    }

    pub fn high(&self) -> f64 {
        match *self {
            ValuationDistribution::Uniform { high, .. } => high,
        }
    }

    pub fn width(&self) -> f64 {
        self.high() - self.low()
    }

    /// Position of a value on the unit scale of the support
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.low()) / self.width()
    }
}

/// Largest number of bidders the solvers accept
pub const MAX_BIDDERS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionParams {
    pub format: AuctionFormat,
    pub num_bidders: usize,
    pub distribution: ValuationDistribution,
    /// Lowest acceptable price, in [0, high)
    #[serde(default)]
    pub reserve_price: f64,
    /// Realized valuations, one per bidder, for a concrete outcome
    #[serde(default)]
    pub valuations: Option<Vec<f64>>,
    /// Clock step of the English auction; 0 is a continuous clock
    #[serde(default)]
    pub bid_increment: f64,
}

impl AuctionParams {
    pub fn new(format: AuctionFormat, num_bidders: usize, low: f64, high: f64) -> Result<Self> {
        let params = AuctionParams {
            format,
            num_bidders,
            distribution: ValuationDistribution::Uniform { low, high },
            reserve_price: 0.0,
            valuations: None,
            bid_increment: 0.0,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        at_least("num_bidders", self.num_bidders, 2)?;
        if self.num_bidders > MAX_BIDDERS {
            return Err(SolverError::invalid(
                "num_bidders",
                format!("must be at most {}", MAX_BIDDERS),
            ));
        }
        self.distribution.validate()?;
        non_negative("reserve_price", self.reserve_price)?;
        if self.reserve_price >= self.distribution.high() {
            return Err(SolverError::invalid(
                "reserve_price",
                "must be below the top of the valuation support",
            ));
        }
        non_negative("bid_increment", self.bid_increment)?;

        if let Some(values) = &self.valuations {
            if values.len() != self.num_bidders {
                return Err(SolverError::invalid(
                    "valuations",
                    format!("expected {} values, got {}", self.num_bidders, values.len()),
                ));
            }
            let (low, high) = (self.distribution.low(), self.distribution.high());
            for (i, v) in values.iter().enumerate() {
                let name = format!("valuations[{}]", i);
                finite(&name, *v)?;
                if *v < low || *v > high {
                    return Err(SolverError::invalid(
                        name,
                        format!("must lie in the support [{}, {}]", low, high),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Reserve price on the unit scale of the support, clamped to [0, 1]
    pub fn normalized_reserve(&self) -> f64 {
        self.distribution.normalize(self.reserve_price).clamp(0.0, 1.0)
    }

    pub fn with_format(&self, format: AuctionFormat) -> Self {
        AuctionParams {
            format,
            ..self.clone()
        }
    }
}

impl Default for AuctionParams {
    /// Four bidders with values uniform on [0, 1]
    fn default() -> Self {
        AuctionParams {
            format: AuctionFormat::FirstPrice,
            num_bidders: 4,
            distribution: ValuationDistribution::Uniform { low: 0.0, high: 1.0 },
            reserve_price: 0.0,
            valuations: None,
            bid_increment: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bidder_is_invalid() {
        assert!(AuctionParams::new(AuctionFormat::English, 1, 0.0, 1.0).is_err());
    }

    #[test]
    fn bidder_count_is_capped() {
        assert!(AuctionParams::new(AuctionFormat::FirstPrice, MAX_BIDDERS, 0.0, 1.0).is_ok());
        let err = AuctionParams::new(AuctionFormat::FirstPrice, MAX_BIDDERS + 1, 0.0, 1.0).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
        assert!(err.to_string().contains("num_bidders"));
    }

    #[test]
    fn empty_support_is_invalid() {
        assert!(AuctionParams::new(AuctionFormat::Dutch, 3, 2.0, 2.0).is_err());
    }

    #[test]
    fn reserve_at_top_of_support_is_invalid() {
        let params = AuctionParams {
            reserve_price: 1.0,
            ..AuctionParams::default()
        };
        assert_eq!(params.validate().unwrap_err().kind(), "invalid-parameter");
    }

    #[test]
    fn valuations_must_match_bidders_and_support() {
        let params = AuctionParams {
            valuations: Some(vec![0.5, 0.2]),
            ..AuctionParams::default()
        };
        assert!(params.validate().is_err());

        let params = AuctionParams {
            valuations: Some(vec![0.5, 0.2, 1.2, 0.1]),
            ..AuctionParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn reserve_below_support_is_not_binding() {
        let params = AuctionParams {
            distribution: ValuationDistribution::Uniform { low: 10.0, high: 20.0 },
            reserve_price: 5.0,
            ..AuctionParams::default()
        };
        assert_eq!(params.normalized_reserve(), 0.0);
    }
}
