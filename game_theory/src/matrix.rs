use econ_core::{at_least, finite, Result, SolverError};
use serde::{Deserialize, Serialize};

/// Largest strategy set either player may have
pub const MAX_STRATEGIES: usize = 16;

/// Two-player normal-form game
///
/// `row_payoffs[i][j]` and `column_payoffs[i][j]` are the payoffs when the
/// row player picks strategy `i` and the column player picks strategy `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub row_payoffs: Vec<Vec<f64>>,
    pub column_payoffs: Vec<Vec<f64>>,
}

impl PayoffMatrix {
    pub fn new(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        row_payoffs: Vec<Vec<f64>>,
        column_payoffs: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let matrix = PayoffMatrix {
            row_labels,
            column_labels,
            row_payoffs,
            column_payoffs,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Symmetric game: the column player's payoff at (i, j) is the row
    /// player's payoff at (j, i)
    pub fn symmetric(labels: &[&str], payoffs: Vec<Vec<f64>>) -> Result<Self> {
        let n = payoffs.len();
        let transposed = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| payoffs.get(j).and_then(|row| row.get(i)).copied().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        PayoffMatrix::new(labels.clone(), labels, payoffs, transposed)
    }

    pub fn validate(&self) -> Result<()> {
        let rows = self.row_labels.len();
        let cols = self.column_labels.len();
        for (name, count) in [("row_labels", rows), ("column_labels", cols)] {
            at_least(name, count, 1)?;
            if count > MAX_STRATEGIES {
                return Err(SolverError::invalid(
                    name,
                    format!("at most {} strategies per player", MAX_STRATEGIES),
                ));
            }
        }

        for (name, table) in [("row_payoffs", &self.row_payoffs), ("column_payoffs", &self.column_payoffs)] {
            if table.len() != rows || table.iter().any(|r| r.len() != cols) {
                return Err(SolverError::invalid(
                    name,
                    format!("must be a {} x {} table", rows, cols),
                ));
            }
            for (i, row) in table.iter().enumerate() {
                for (j, v) in row.iter().enumerate() {
                    finite(&format!("{}[{}][{}]", name, i, j), *v)?;
                }
            }
        }
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn num_columns(&self) -> usize {
        self.column_labels.len()
    }

    /// (row payoff, column payoff) at a profile
    pub fn payoffs(&self, row: usize, column: usize) -> (f64, f64) {
        (self.row_payoffs[row][column], self.column_payoffs[row][column])
    }

    fn payoff_sums(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_rows()).flat_map(move |i| {
            (0..self.num_columns()).map(move |j| {
                let (a, b) = self.payoffs(i, j);
                a + b
            })
        })
    }

    /// Largest joint payoff over every cell
    pub fn max_payoff_sum(&self) -> f64 {
        self.payoff_sums().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest joint payoff over every cell
    pub fn min_payoff_sum(&self) -> f64 {
        self.payoff_sums().fold(f64::INFINITY, f64::min)
    }
}

/// Symmetric prisoner's dilemma with Cooperate/Defect strategies
pub fn prisoners_dilemma(reward: f64, temptation: f64, punishment: f64, sucker: f64) -> Result<PayoffMatrix> {
    PayoffMatrix::symmetric(
        &["Cooperate", "Defect"],
        vec![vec![reward, sucker], vec![temptation, punishment]],
    )
}

/// Two potential entrants deciding whether to enter a market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryGameParams {
    pub entry_cost: f64,
    /// Profit of a lone entrant before the entry cost
    pub monopoly_profit: f64,
    /// Profit of each entrant when both enter, before the entry cost
    pub duopoly_profit: f64,
}

impl EntryGameParams {
    pub fn matrix(&self) -> Result<PayoffMatrix> {
        entry_game(self.entry_cost, self.monopoly_profit, self.duopoly_profit)
    }
}

impl Default for EntryGameParams {
    fn default() -> Self {
        EntryGameParams {
            entry_cost: 30.0,
            monopoly_profit: 100.0,
            duopoly_profit: 20.0,
        }
    }
}

/// Entry game: staying out earns nothing, entering costs `entry_cost`
pub fn entry_game(entry_cost: f64, monopoly_profit: f64, duopoly_profit: f64) -> Result<PayoffMatrix> {
    finite("entry_cost", entry_cost)?;
    finite("monopoly_profit", monopoly_profit)?;
    finite("duopoly_profit", duopoly_profit)?;
    let both = duopoly_profit - entry_cost;
    let alone = monopoly_profit - entry_cost;
    PayoffMatrix::symmetric(&["Enter", "Stay Out"], vec![vec![both, alone], vec![0.0, 0.0]])
}

/// Symmetric high/low pricing game from a 2x2 row-player payoff table
pub fn pricing_game(payoffs: [[f64; 2]; 2]) -> Result<PayoffMatrix> {
    PayoffMatrix::symmetric(
        &["High Price", "Low Price"],
        payoffs.iter().map(|row| row.to_vec()).collect(),
    )
}
