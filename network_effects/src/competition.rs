//! Two platforms competing for one pool of users
//!
//! A user of platform i gets its quality q_i plus β for every other user on
//! the same platform. With platform 1 holding share x of N users, users
//! prefer platform 1 exactly when
//!
//! ```text
//! q₁ - q₂ + β·N·(2x - 1) > 0
//! ```
//!
//! The split x̂ = (β·N + q₂ - q₁)/(2·β·N) where users are indifferent is a
//! tipping point: from any share above it users drift to platform 1, from
//! any share below it they leave. The market therefore tips to one platform,
//! and which one depends on where it starts, not only on quality.

use econ_core::{finite, in_range, non_negative, output, positive, Result, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompetitionParams {
    /// Value β to one user of each other user on the same platform
    pub network_strength: f64,
    /// Stand-alone quality of each platform
    pub qualities: [f64; 2],
    pub total_users: f64,
    /// Platform 1's share before users re-sort
    #[serde(default = "even_split")]
    pub initial_share: f64,
}

fn even_split() -> f64 {
    0.5
}

impl CompetitionParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("network_strength", self.network_strength)?;
        finite("qualities.0", self.qualities[0])?;
        finite("qualities.1", self.qualities[1])?;
        positive("total_users", self.total_users)?;
        in_range("initial_share", self.initial_share, 0.0, 1.0)?;
        Ok(())
    }

    /// Utility advantage of platform 1 when it holds share `x`
    fn preference(&self, x: f64) -> f64 {
        let [q1, q2] = self.qualities;
        q1 - q2 + self.network_strength * self.total_users * (2.0 * x - 1.0)
    }

    /// Interior share at which users are indifferent, if there is one
    fn tipping_share(&self) -> Option<f64> {
        let scale = self.network_strength * self.total_users;
        if scale <= 0.0 {
            return None;
        }
        let [q1, q2] = self.qualities;
        let x = (scale + q2 - q1) / (2.0 * scale);
        (x > 0.0 && x < 1.0).then_some(x)
    }

    /// Total user utility when platform 1 holds share `x`
    fn surplus(&self, x: f64) -> f64 {
        let n = self.total_users;
        let users = [x * n, (1.0 - x) * n];
        users
            .iter()
            .zip(self.qualities.iter())
            .map(|(u, q)| u * (q + self.network_strength * u))
            .sum()
    }
}

impl Default for CompetitionParams {
    /// Platform 2 is better and the market starts evenly split
    fn default() -> Self {
        CompetitionParams {
            network_strength: 0.01,
            qualities: [1.0, 1.5],
            total_users: 1000.0,
            initial_share: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionOutcome {
    pub market_shares: [f64; 2],
    pub users: [f64; 2],
    /// β times each platform's user count
    pub network_values: [f64; 2],
    pub utilities: [f64; 2],
    /// Platform 1 share where users are indifferent; `None` when one
    /// platform is preferred at every split
    pub tipping_share: Option<f64>,
    /// Index of the platform that took the whole market
    pub winner: Option<usize>,
    pub consumer_surplus: f64,
    /// Everyone on the better platform
    pub efficient_surplus: f64,
}

impl CompetitionOutcome {
    pub fn tipped(&self) -> bool {
        self.winner.is_some()
    }

    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(self.consumer_surplus, 0.0, self.efficient_surplus)
    }
}

/// Where users settle from the initial split
pub fn platform_competition(params: &CompetitionParams) -> Result<CompetitionOutcome> {
    params.validate()?;
    let advantage = params.preference(params.initial_share);
    let (share, winner) = if advantage > 0.0 {
        (1.0, Some(0))
    } else if advantage < 0.0 {
        (0.0, Some(1))
    } else {
        (params.initial_share, None)
    };

    let n = params.total_users;
    let beta = params.network_strength;
    let market_shares = [share, 1.0 - share];
    let users = market_shares.map(|s| s * n);
    let network_values = users.map(|u| beta * u);
    let utilities = [
        params.qualities[0] + network_values[0],
        params.qualities[1] + network_values[1],
    ];
    let best_quality = params.qualities[0].max(params.qualities[1]);

    let outcome = CompetitionOutcome {
        market_shares,
        users,
        network_values,
        utilities,
        tipping_share: params.tipping_share(),
        winner,
        consumer_surplus: output("consumer_surplus", params.surplus(share))?,
        efficient_surplus: output("efficient_surplus", n * best_quality + beta * n * n)?,
    };
    debug!(
        share = outcome.market_shares[0],
        tipping_share = ?outcome.tipping_share,
        winner = ?outcome.winner,
        "platform competition"
    );
    Ok(outcome)
}

/// Outcome of one network strength in a tipping analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TippingPoint {
    pub network_strength: f64,
    pub market_shares: [f64; 2],
    pub tipping_share: Option<f64>,
    pub winner: Option<usize>,
}

/// Re-solve the competition at each network strength
pub fn network_tipping(params: &CompetitionParams, strengths: &[f64]) -> Result<Vec<TippingPoint>> {
    strengths
        .iter()
        .map(|beta| {
            let outcome = platform_competition(&CompetitionParams {
                network_strength: *beta,
                ..*params
            })?;
            Ok(TippingPoint {
                network_strength: *beta,
                market_shares: outcome.market_shares,
                tipping_share: outcome.tipping_share,
                winner: outcome.winner,
            })
        })
        .collect()
}
