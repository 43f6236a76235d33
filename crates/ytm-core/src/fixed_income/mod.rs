pub mod pricing;
pub mod solver;
pub mod yields;

pub use pricing::{bond_price, bond_price_derivative};
pub use solver::{solve_ytm, BondParams, SolveOutcome, SolverConfig};
