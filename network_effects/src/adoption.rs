//! Adoption of a good whose value grows with its user base
//!
//! Consumers have tastes θ ~ U[0, 1] and adopt when θ·(v + βx) ≥ c, where x
//! is the fraction that has already adopted. The share willing to adopt is
//!
//! ```text
//! R(x) = clamp(1 - c/(v + βx), 0, 1)
//! ```
//!
//! and equilibria are the fixed points x = R(x). With weak standalone value
//! there are three: no adoption and high adoption are stable, and the
//! unstable one between them is the critical mass.

use econ_core::{
    bisect, fixed_point, in_range, non_negative, output, positive, IterationOptions, Result, SolverError,
    WelfareMetrics,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cells of the grid used to bracket fixed points
const GRID_CELLS: usize = 1000;

/// |R(x) - x| at or below this counts as an exact fixed point
const ROOT_EPSILON: f64 = 1e-14;

/// Closest approach of R(x) to x at or below this counts as a tangency
const TANGENCY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdoptionParams {
    pub standalone_value: f64,
    /// Extra value per unit of adopter fraction
    pub network_value: f64,
    pub adoption_cost: f64,
    /// Adopter fraction the dynamics start from
    pub initial_fraction: f64,
}

impl AdoptionParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("standalone_value", self.standalone_value)?;
        non_negative("network_value", self.network_value)?;
        positive("adoption_cost", self.adoption_cost)?;
        in_range("initial_fraction", self.initial_fraction, 0.0, 1.0)?;
        let ceiling = self.standalone_value + self.network_value;
        if self.adoption_cost >= ceiling {
            return Err(SolverError::invalid(
                "adoption_cost",
                format!("must be below the full-network value {}", ceiling),
            ));
        }
        Ok(())
    }

    /// Gross value of adopting when a fraction `x` has adopted
    fn value(&self, x: f64) -> f64 {
        self.standalone_value + self.network_value * x
    }

    /// Fraction of consumers who want to adopt given current adoption `x`
    pub fn response(&self, x: f64) -> f64 {
        let value = self.value(x);
        if value <= self.adoption_cost {
            return 0.0;
        }
        (1.0 - self.adoption_cost / value).clamp(0.0, 1.0)
    }

    /// Right derivative of the response
    pub fn response_slope(&self, x: f64) -> f64 {
        let value = self.value(x);
        if value < self.adoption_cost {
            return 0.0;
        }
        self.adoption_cost * self.network_value / (value * value)
    }

    /// Total surplus when the consumers with the highest tastes adopt up to
    /// fraction `x`: ∫ (θ(v + βx) - c) dθ over [1 - x, 1]
    pub fn surplus(&self, x: f64) -> f64 {
        self.value(x) * x * (2.0 - x) / 2.0 - self.adoption_cost * x
    }
}

impl Default for AdoptionParams {
    /// No standalone value, so adoption only pays once the network is large
    fn default() -> Self {
        AdoptionParams {
            standalone_value: 0.0,
            network_value: 1.0,
            adoption_cost: 0.2,
            initial_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stability {
    Stable,
    Unstable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    pub fraction: f64,
    /// R'(x*) at the fixed point
    pub slope: f64,
    pub stability: Stability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionOutcome {
    /// Every fixed point in [0, 1], ascending
    pub fixed_points: Vec<FixedPoint>,
    /// Unstable interior fixed point separating the basins of attraction
    pub critical_mass: Option<f64>,
    /// Adopter fraction per period from the initial fraction
    pub trajectory: Vec<f64>,
    /// Where the trajectory settles
    pub equilibrium_fraction: f64,
    pub iterations: usize,
    /// First period with at least half the market adopting
    pub periods_to_majority: Option<usize>,
    pub consumer_surplus: f64,
    /// Adoption level a planner would pick
    pub optimal_fraction: f64,
    pub efficient_surplus: f64,
}

impl AdoptionOutcome {
    pub fn stable_points(&self) -> impl Iterator<Item = &FixedPoint> {
        self.fixed_points.iter().filter(|p| p.stability == Stability::Stable)
    }

    /// Adoption cost is a resource cost, so all surplus accrues to adopters
    pub fn welfare(&self) -> WelfareMetrics {
        WelfareMetrics::from_surplus(self.consumer_surplus, 0.0, self.efficient_surplus)
    }
}

/// Point of [lo, hi] where |f| is smallest, by golden-section search
fn closest_approach<F>(f: F, mut lo: f64, mut hi: f64, options: &IterationOptions) -> f64
where
    F: Fn(f64) -> f64,
{
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let mut a = hi - ratio * (hi - lo);
    let mut b = lo + ratio * (hi - lo);
    let (mut fa, mut fb) = (f(a).abs(), f(b).abs());
    for _ in 0..options.max_iterations {
        if hi - lo <= options.tolerance {
            break;
        }
        if fa <= fb {
            hi = b;
            b = a;
            fb = fa;
            a = hi - ratio * (hi - lo);
            fa = f(a).abs();
        } else {
            lo = a;
            a = b;
            fa = fb;
            b = lo + ratio * (hi - lo);
            fb = f(b).abs();
        }
    }
    (lo + hi) / 2.0
}

/// Bracket sign changes of R(x) - x on a grid, then bisect each bracket
///
/// A tangency (double root) has no sign change. Wherever |R(x) - x| dips
/// between two grid neighbours of the same sign, the dip is searched for a
/// touch of zero; a tangent fixed point attracts from one side only and is
/// reported as unstable.
pub fn fixed_points(params: &AdoptionParams, options: &IterationOptions) -> Result<Vec<FixedPoint>> {
    params.validate()?;
    let gap = |x: f64| params.response(x) - x;
    let node = |i: usize| i as f64 / GRID_CELLS as f64;
    let gaps: Vec<f64> = (0..=GRID_CELLS).map(|i| gap(node(i))).collect();

    // (fraction, tangent)
    let mut roots = Vec::new();
    if gaps[0].abs() <= ROOT_EPSILON {
        roots.push((0.0, false));
    }
    for i in 1..=GRID_CELLS {
        let (prev, g) = (gaps[i - 1], gaps[i]);
        if g.abs() <= ROOT_EPSILON {
            roots.push((node(i), false));
        } else if prev.abs() > ROOT_EPSILON && g.signum() != prev.signum() {
            roots.push((bisect(gap, node(i - 1), node(i), options)?, false));
        }
    }

    for i in 1..GRID_CELLS {
        let (left, mid, right) = (gaps[i - 1], gaps[i], gaps[i + 1]);
        let same_sign = left.signum() == mid.signum() && mid.signum() == right.signum();
        let dip = mid.abs() > ROOT_EPSILON && mid.abs() <= left.abs() && mid.abs() < right.abs();
        if same_sign && dip {
            let x = closest_approach(gap, node(i - 1), node(i + 1), options);
            if gap(x).abs() <= TANGENCY_EPSILON {
                debug!(fraction = x, "tangent fixed point");
                roots.push((x, true));
            }
        }
    }
    roots.sort_by(|a, b| a.0.total_cmp(&b.0));

    roots
        .into_iter()
        .map(|(fraction, tangent)| {
            let slope = output("fixed_point_slope", params.response_slope(fraction))?;
            let stability = if !tangent && slope.abs() < 1.0 {
                Stability::Stable
            } else {
                Stability::Unstable
            };
            Ok(FixedPoint {
                fraction,
                slope,
                stability,
            })
        })
        .collect()
}

/// Best adoption level for total surplus
///
/// S'(x) = -(3β/2)x² + (2β - v)x + (v - c); the optimum is an interior
/// root of S' or an endpoint.
fn optimal_fraction(params: &AdoptionParams) -> f64 {
    let (v, beta, c) = (params.standalone_value, params.network_value, params.adoption_cost);
    let mut candidates = vec![0.0, 1.0];
    let (qa, qb, qc) = (-1.5 * beta, 2.0 * beta - v, v - c);
    if qa.abs() < f64::EPSILON {
        if qb.abs() > f64::EPSILON {
            candidates.push(-qc / qb);
        }
    } else {
        let disc = qb * qb - 4.0 * qa * qc;
        if disc >= 0.0 {
            let root = disc.sqrt();
            candidates.push((-qb + root) / (2.0 * qa));
            candidates.push((-qb - root) / (2.0 * qa));
        }
    }
    candidates
        .into_iter()
        .filter(|x| (0.0..=1.0).contains(x))
        .fold((0.0, f64::NEG_INFINITY), |best, x| {
            let s = params.surplus(x);
            if s > best.1 {
                (x, s)
            } else {
                best
            }
        })
        .0
}

pub fn adoption(params: &AdoptionParams, options: &IterationOptions) -> Result<AdoptionOutcome> {
    let points = fixed_points(params, options)?;
    let critical_mass = points
        .iter()
        .find(|p| p.stability == Stability::Unstable && p.fraction > 0.0 && p.fraction < 1.0)
        .map(|p| p.fraction);

    let path = fixed_point(|x| params.response(x), params.initial_fraction, options)?;
    let periods_to_majority = path.trajectory.iter().position(|x| *x >= 0.5);
    let equilibrium_fraction = path.value;

    let optimal = optimal_fraction(params);
    let outcome = AdoptionOutcome {
        fixed_points: points,
        critical_mass,
        equilibrium_fraction,
        iterations: path.iterations,
        trajectory: path.trajectory,
        periods_to_majority,
        consumer_surplus: output("consumer_surplus", params.surplus(equilibrium_fraction))?,
        optimal_fraction: optimal,
        efficient_surplus: output("efficient_surplus", params.surplus(optimal))?,
    };
    debug!(
        fixed_points = outcome.fixed_points.len(),
        critical_mass = ?outcome.critical_mass,
        equilibrium_fraction,
        iterations = outcome.iterations,
        "network adoption"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Interior fixed points solve x² - x + 0.2 = 0
    const LOW_ROOT: f64 = 0.276_393_202_250_021;
    const HIGH_ROOT: f64 = 0.723_606_797_749_979;

    #[test]
    fn three_fixed_points_with_critical_mass_between() {
        let points = fixed_points(&AdoptionParams::default(), &IterationOptions::default()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].fraction, 0.0);
        assert_eq!(points[0].stability, Stability::Stable);
        assert_abs_diff_eq!(points[1].fraction, LOW_ROOT, epsilon = 1e-9);
        assert_eq!(points[1].stability, Stability::Unstable);
        assert_abs_diff_eq!(points[2].fraction, HIGH_ROOT, epsilon = 1e-9);
        assert_eq!(points[2].stability, Stability::Stable);
    }

    #[test]
    fn start_above_critical_mass_grows_to_high_adoption() {
        let params = AdoptionParams {
            initial_fraction: 0.3,
            ..AdoptionParams::default()
        };
        let outcome = adoption(&params, &IterationOptions::default()).unwrap();
        assert_abs_diff_eq!(outcome.critical_mass.unwrap(), LOW_ROOT, epsilon = 1e-9);
        assert_abs_diff_eq!(outcome.equilibrium_fraction, HIGH_ROOT, epsilon = 1e-8);
        let t = outcome.periods_to_majority.unwrap();
        assert!(t > 0 && t <= 5);
        assert!(outcome.trajectory[t] >= 0.5);
    }

    #[test]
    fn start_below_critical_mass_collapses() {
        let params = AdoptionParams {
            initial_fraction: 0.2,
            ..AdoptionParams::default()
        };
        let outcome = adoption(&params, &IterationOptions::default()).unwrap();
        assert_eq!(outcome.equilibrium_fraction, 0.0);
        assert_eq!(outcome.periods_to_majority, None);
        assert_eq!(outcome.consumer_surplus, 0.0);
    }

    #[test]
    fn adopters_ignore_the_value_they_create_for_others() {
        let outcome = adoption(&AdoptionParams::default(), &IterationOptions::default()).unwrap();
        // Full adoption yields ∫₀¹ θ dθ - 0.2
        assert_eq!(outcome.optimal_fraction, 1.0);
        assert_abs_diff_eq!(outcome.efficient_surplus, 0.3, epsilon = 1e-12);
        assert!(outcome.welfare().deadweight_loss > 0.0);
    }

    #[test]
    fn strong_standalone_value_has_no_critical_mass() {
        let params = AdoptionParams {
            standalone_value: 1.0,
            network_value: 0.5,
            adoption_cost: 0.2,
            initial_fraction: 0.0,
        };
        let outcome = adoption(&params, &IterationOptions::default()).unwrap();
        assert_eq!(outcome.critical_mass, None);
        assert_eq!(outcome.fixed_points.len(), 1);
        assert_eq!(outcome.stable_points().count(), 1);
        assert!(outcome.equilibrium_fraction > 0.5);
    }

    #[test]
    fn tangent_fixed_point_between_grid_nodes_is_found() {
        // x = R(x) reduces to (x - 1/3)² = 0, which touches off the grid
        let params = AdoptionParams {
            standalone_value: 1.0 / 3.0,
            network_value: 1.0,
            adoption_cost: 4.0 / 9.0,
            initial_fraction: 0.2,
        };
        let points = fixed_points(&params, &IterationOptions::default()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].fraction, 0.0);
        assert_eq!(points[0].stability, Stability::Stable);
        assert_abs_diff_eq!(points[1].fraction, 1.0 / 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(points[1].slope, 1.0, epsilon = 1e-5);
        assert_eq!(points[1].stability, Stability::Unstable);

        let outcome = adoption(&params, &IterationOptions::default()).unwrap();
        assert_abs_diff_eq!(outcome.critical_mass.unwrap(), 1.0 / 3.0, epsilon = 1e-6);
        assert_eq!(outcome.equilibrium_fraction, 0.0);
    }

    #[test]
    fn near_miss_is_not_a_fixed_point() {
        // Same curve with the cost nudged up: R(x) stays 1e-4 short of x
        let params = AdoptionParams {
            standalone_value: 1.0 / 3.0,
            network_value: 1.0,
            adoption_cost: 4.0 / 9.0 + 1e-4,
            initial_fraction: 0.2,
        };
        let points = fixed_points(&params, &IterationOptions::default()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].fraction, 0.0);
    }

    #[test]
    fn cost_above_full_network_value_is_invalid() {
        let params = AdoptionParams {
            adoption_cost: 1.0,
            ..AdoptionParams::default()
        };
        let err = adoption(&params, &IterationOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
    }
}
