//! Dominance and pure-strategy Nash equilibria of a normal-form game

use std::cmp::Ordering;

use econ_core::{Result, WelfareMetrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matrix::PayoffMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dominance {
    /// Strictly better against every opponent strategy
    Strict,
    /// Never worse, and strictly better somewhere against each alternative
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantStrategy {
    pub index: usize,
    pub label: String,
    pub dominance: Dominance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub row: usize,
    pub column: usize,
    pub row_label: String,
    pub column_label: String,
    pub row_payoff: f64,
    pub column_payoff: f64,
}

impl Equilibrium {
    pub fn payoff_sum(&self) -> f64 {
        self.row_payoff + self.column_payoff
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub row_dominant: Option<DominantStrategy>,
    pub column_dominant: Option<DominantStrategy>,
    /// Profile in which both players use their dominant strategy
    pub dominant_profile: Option<(usize, usize)>,
    /// Pure Nash equilibria, payoff sum descending then (row, column) ascending
    pub equilibria: Vec<Equilibrium>,
    /// Largest joint payoff in any cell
    pub max_payoff_sum: f64,
    /// Smallest joint payoff in any cell
    pub min_payoff_sum: f64,
}

impl GameAnalysis {
    pub fn has_equilibrium(&self) -> bool {
        !self.equilibria.is_empty()
    }

    /// Producer surplus is the joint payoff of the top-ranked equilibrium;
    /// the benchmark is the best joint payoff in the matrix
    ///
    /// When some cell has a negative joint payoff, both are measured from
    /// the worst cell instead of from zero so that surplus stays
    /// non-negative. A game without a pure equilibrium scores the baseline.
    pub fn welfare(&self) -> WelfareMetrics {
        let baseline = self.min_payoff_sum.min(0.0);
        let producer = self
            .equilibria
            .first()
            .map_or(0.0, |e| e.payoff_sum() - baseline);
        WelfareMetrics::from_surplus(0.0, producer, self.max_payoff_sum - baseline)
    }
}

/// Strategy of one player that dominates all of its alternatives
///
/// `payoff(own, other)` is the player's payoff with its own strategy first.
fn dominant<F>(own: usize, other: usize, payoff: F) -> Option<(usize, Dominance)>
where
    F: Fn(usize, usize) -> f64,
{
    if own == 1 {
        return Some((0, Dominance::Strict));
    }

    let compare = |i: usize, k: usize| -> Option<Dominance> {
        let mut strictly_somewhere = false;
        let mut strictly_everywhere = true;
        for j in 0..other {
            match payoff(i, j).partial_cmp(&payoff(k, j))? {
                Ordering::Less => return None,
                Ordering::Equal => strictly_everywhere = false,
                Ordering::Greater => strictly_somewhere = true,
            }
        }
        match (strictly_everywhere, strictly_somewhere) {
            (true, _) => Some(Dominance::Strict),
            (false, true) => Some(Dominance::Weak),
            (false, false) => None,
        }
    };

    (0..own).find_map(|i| {
        let mut overall = Dominance::Strict;
        for k in (0..own).filter(|k| *k != i) {
            match compare(i, k)? {
                Dominance::Weak => overall = Dominance::Weak,
                Dominance::Strict => {}
            }
        }
        Some((i, overall))
    })
}

/// Dominant strategies and pure Nash equilibria
pub fn analyze(matrix: &PayoffMatrix) -> Result<GameAnalysis> {
    matrix.validate()?;
    let rows = matrix.num_rows();
    let cols = matrix.num_columns();

    let row_dominant = dominant(rows, cols, |i, j| matrix.row_payoffs[i][j]).map(|(index, dominance)| {
        DominantStrategy {
            index,
            label: matrix.row_labels[index].clone(),
            dominance,
        }
    });
    let column_dominant =
        dominant(cols, rows, |j, i| matrix.column_payoffs[i][j]).map(|(index, dominance)| DominantStrategy {
            index,
            label: matrix.column_labels[index].clone(),
            dominance,
        });
    let dominant_profile = match (&row_dominant, &column_dominant) {
        (Some(r), Some(c)) => Some((r.index, c.index)),
        _ => None,
    };

    let mut equilibria = Vec::new();
    for i in 0..rows {
        for j in 0..cols {
            let (a, b) = matrix.payoffs(i, j);
            let row_best = (0..rows).all(|k| matrix.row_payoffs[k][j] <= a);
            let column_best = (0..cols).all(|l| matrix.column_payoffs[i][l] <= b);
            if row_best && column_best {
                equilibria.push(Equilibrium {
                    row: i,
                    column: j,
                    row_label: matrix.row_labels[i].clone(),
                    column_label: matrix.column_labels[j].clone(),
                    row_payoff: a,
                    column_payoff: b,
                });
            }
        }
    }
    equilibria.sort_by(|x, y| {
        y.payoff_sum()
            .total_cmp(&x.payoff_sum())
            .then(x.row.cmp(&y.row))
            .then(x.column.cmp(&y.column))
    });

    debug!(
        equilibria = equilibria.len(),
        dominant_profile = ?dominant_profile,
        "normal-form analysis"
    );
    Ok(GameAnalysis {
        row_dominant,
        column_dominant,
        dominant_profile,
        equilibria,
        max_payoff_sum: matrix.max_payoff_sum(),
        min_payoff_sum: matrix.min_payoff_sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{entry_game, pricing_game, prisoners_dilemma};

    #[test]
    fn prisoners_dilemma_has_dominant_defection() {
        let analysis = analyze(&prisoners_dilemma(3.0, 5.0, 1.0, 0.0).unwrap()).unwrap();
        let row = analysis.row_dominant.as_ref().unwrap();
        assert_eq!(row.label, "Defect");
        assert_eq!(row.dominance, Dominance::Strict);
        assert_eq!(analysis.dominant_profile, Some((1, 1)));
        assert_eq!(analysis.equilibria.len(), 1);
        assert_eq!(analysis.equilibria[0].payoff_sum(), 2.0);

        let w = analysis.welfare();
        assert_eq!(w.total_surplus, 2.0);
        assert_eq!(w.deadweight_loss, 4.0);
    }

    #[test]
    fn entry_game_has_two_asymmetric_equilibria() {
        let analysis = analyze(&entry_game(30.0, 100.0, 20.0).unwrap()).unwrap();
        assert!(analysis.dominant_profile.is_none());
        let profiles: Vec<_> = analysis.equilibria.iter().map(|e| (e.row, e.column)).collect();
        // Equal payoff sums fall back to (row, column) order
        assert_eq!(profiles, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn coordination_equilibria_ordered_by_payoff_sum() {
        let matrix = PayoffMatrix::symmetric(&["A", "B"], vec![vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();
        let analysis = analyze(&matrix).unwrap();
        let profiles: Vec<_> = analysis.equilibria.iter().map(|e| (e.row, e.column)).collect();
        assert_eq!(profiles, vec![(1, 1), (0, 0)]);
    }

    #[test]
    fn matching_pennies_has_no_pure_equilibrium() {
        let matrix = PayoffMatrix::new(
            vec!["H".into(), "T".into()],
            vec!["H".into(), "T".into()],
            vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
            vec![vec![-1.0, 1.0], vec![1.0, -1.0]],
        )
        .unwrap();
        let analysis = analyze(&matrix).unwrap();
        assert!(!analysis.has_equilibrium());
        assert_eq!(analysis.welfare().producer_surplus, 0.0);
    }

    #[test]
    fn losses_everywhere_keep_efficiency_in_unit_range() {
        // Prisoner's dilemma shifted down by 10: joint payoffs -14, -15, -15, -18
        let matrix = PayoffMatrix::symmetric(
            &["Cooperate", "Defect"],
            vec![vec![-7.0, -10.0], vec![-5.0, -9.0]],
        )
        .unwrap();
        let w = analyze(&matrix).unwrap().welfare();
        assert_eq!(w.producer_surplus, 0.0);
        assert_eq!(w.efficient_surplus, 4.0);
        assert_eq!(w.deadweight_loss, 4.0);
        assert_eq!(w.efficiency_ratio, 0.0);
        assert!(w.is_consistent());

        // Losing coordination game: the best equilibrium is also the best cell
        let matrix = PayoffMatrix::symmetric(&["A", "B"], vec![vec![-1.0, -5.0], vec![-5.0, -2.0]]).unwrap();
        let w = analyze(&matrix).unwrap().welfare();
        assert_eq!(w.total_surplus, 8.0);
        assert_eq!(w.efficiency_ratio, 1.0);
        assert!((0.0..=1.0).contains(&w.efficiency_ratio));
    }

    #[test]
    fn weak_dominance_is_reported() {
        let matrix = pricing_game([[2.0, 0.0], [2.0, 1.0]]).unwrap();
        let analysis = analyze(&matrix).unwrap();
        let row = analysis.row_dominant.unwrap();
        assert_eq!(row.index, 1);
        assert_eq!(row.dominance, Dominance::Weak);
    }

    #[test]
    fn identical_strategies_dominate_nothing() {
        let matrix = PayoffMatrix::symmetric(&["A", "B"], vec![vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let analysis = analyze(&matrix).unwrap();
        assert!(analysis.row_dominant.is_none());
        assert_eq!(analysis.equilibria.len(), 4);
    }
}
