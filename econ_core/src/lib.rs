//! Shared numerical core for the equilibrium solvers
//!
//! Every model crate in the workspace builds on the pieces here:
//! - `SolverError`: the three recoverable failure kinds a solve can report
//! - validation helpers that turn out-of-domain inputs into `InvalidParameter`
//! - `solve_linear`: dense linear systems for simultaneous best responses
//! - `bisect` / `fixed_point`: bounded iterations with an explicit tolerance
//! - `WelfareMetrics`: the surplus record derived from any equilibrium
//!
//! Nothing in this crate holds state between calls.

pub mod error;
pub mod iterate;
pub mod linalg;
pub mod validate;
pub mod welfare;

pub use error::{Result, SolverError};
pub use iterate::{bisect, fixed_point, Convergence, IterationOptions};
pub use linalg::{solve_linear, SINGULAR_TOLERANCE};
pub use validate::{at_least, below, finite, in_range, non_negative, output, positive};
pub use welfare::WelfareMetrics;
