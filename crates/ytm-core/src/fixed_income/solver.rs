//! Newton-Raphson inversion of the bond pricing function.
//!
//! The solver starts from a fixed guess and applies
//!   y_{k+1} = y_k - (P(y_k) - market_price) / P'(y_k)
//! until successive estimates agree within tolerance, the derivative
//! collapses, or the iteration budget runs out. Only invalid inputs are
//! errors; the three terminal conditions are reported as [`SolveOutcome`]
//! variants so callers can tell them apart.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::pricing::{bond_price, bond_price_derivative, validate_bond_terms};
use crate::error::YtmError;
use crate::types::{Money, Rate, Years};
use crate::YtmResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Starting yield for every solve (5%).
pub const DEFAULT_INITIAL_GUESS: Rate = dec!(0.05);

/// Successive estimates closer than this are treated as converged (1e-6).
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.000001);

/// Iteration budget for one solve.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Derivative magnitude below which the solver stops stepping (1e-10).
pub const DEFAULT_STAGNATION_EPSILON: Decimal = dec!(0.0000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Bond valuation parameters for one solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondParams {
    /// Face (par) value repaid at maturity.
    pub face_value: Money,
    /// Coupon rate per period as a decimal.
    pub coupon_rate: Rate,
    /// Number of annual periods until maturity.
    pub years_to_maturity: Years,
    /// Observed market price.
    pub market_price: Money,
}

impl BondParams {
    /// Reject non-positive face value, maturity or market price and out-of-range coupons.
    pub fn validate(&self) -> YtmResult<()> {
        validate_bond_terms(self.face_value, self.coupon_rate, self.years_to_maturity)?;
        if self.market_price <= Decimal::ZERO {
            return Err(YtmError::InvalidInput {
                field: "market_price".into(),
                reason: "Market price must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Tunable solver constants. Every field falls back to its default when
/// omitted from serialized input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Starting yield estimate as a decimal.
    pub initial_guess: Rate,
    /// Convergence threshold on the step between estimates.
    pub tolerance: Decimal,
    /// Maximum number of Newton updates.
    pub max_iterations: u32,
    /// Derivative floor; below it the iteration stops.
    pub stagnation_epsilon: Decimal,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_INITIAL_GUESS,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            stagnation_epsilon: DEFAULT_STAGNATION_EPSILON,
        }
    }
}

impl SolverConfig {
    /// Reject settings the Newton loop cannot run with.
    pub fn validate(&self) -> YtmResult<()> {
        if self.initial_guess <= -Decimal::ONE {
            return Err(YtmError::InvalidInput {
                field: "solver.initial_guess".into(),
                reason: "Initial guess must be greater than -100%".into(),
            });
        }
        if self.tolerance <= Decimal::ZERO {
            return Err(YtmError::InvalidInput {
                field: "solver.tolerance".into(),
                reason: "Tolerance must be positive".into(),
            });
        }
        if self.max_iterations == 0 {
            return Err(YtmError::InvalidInput {
                field: "solver.max_iterations".into(),
                reason: "At least one iteration is required".into(),
            });
        }
        if self.stagnation_epsilon < Decimal::ZERO {
            return Err(YtmError::InvalidInput {
                field: "solver.stagnation_epsilon".into(),
                reason: "Stagnation epsilon cannot be negative".into(),
            });
        }
        Ok(())
    }
}

/// How a solve terminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    /// Successive estimates agreed within tolerance.
    Converged { ytm: Rate, iterations: u32 },
    /// The derivative fell below the stagnation floor; `estimate` is the
    /// last estimate, not refined further.
    Stagnated {
        estimate: Rate,
        iterations: u32,
        derivative: Decimal,
    },
    /// The iteration budget ran out.
    DidNotConverge {
        best_estimate: Rate,
        iterations_used: u32,
    },
}

impl SolveOutcome {
    /// The yield carried by the outcome, converged or not.
    pub fn ytm(&self) -> Rate {
        match self {
            SolveOutcome::Converged { ytm, .. } => *ytm,
            SolveOutcome::Stagnated { estimate, .. } => *estimate,
            SolveOutcome::DidNotConverge { best_estimate, .. } => *best_estimate,
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            SolveOutcome::Converged { iterations, .. }
            | SolveOutcome::Stagnated { iterations, .. } => *iterations,
            SolveOutcome::DidNotConverge {
                iterations_used, ..
            } => *iterations_used,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, SolveOutcome::Converged { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            SolveOutcome::Converged { .. } => "converged",
            SolveOutcome::Stagnated { .. } => "stagnated",
            SolveOutcome::DidNotConverge { .. } => "did_not_converge",
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for the yield to maturity implied by `params.market_price`.
pub fn solve_ytm(params: &BondParams, config: &SolverConfig) -> YtmResult<SolveOutcome> {
    params.validate()?;
    config.validate()?;

    let mut ytm = config.initial_guess;

    for iteration in 0..config.max_iterations {
        let price = bond_price(
            params.face_value,
            params.coupon_rate,
            params.years_to_maturity,
            ytm,
        )?;
        let derivative = bond_price_derivative(
            params.face_value,
            params.coupon_rate,
            params.years_to_maturity,
            ytm,
        )?;
        let residual = price - params.market_price;

        trace!(iteration, %ytm, %residual, %derivative, "ytm newton step");

        if derivative.abs() < config.stagnation_epsilon {
            warn!(iteration, %ytm, %derivative, "ytm solver stagnated");
            return Ok(SolveOutcome::Stagnated {
                estimate: ytm,
                iterations: iteration,
                derivative,
            });
        }

        let step = residual
            .checked_div(derivative)
            .ok_or_else(|| YtmError::NumericalOverflow {
                context: format!("Newton step at iteration {iteration}"),
            })?;
        let next = ytm - step;

        if next <= -Decimal::ONE {
            warn!(iteration, %ytm, %next, "ytm newton step left the yield domain");
            return Ok(SolveOutcome::DidNotConverge {
                best_estimate: ytm,
                iterations_used: iteration + 1,
            });
        }

        if (next - ytm).abs() < config.tolerance {
            debug!(iterations = iteration + 1, ytm = %next, "ytm solver converged");
            return Ok(SolveOutcome::Converged {
                ytm: next,
                iterations: iteration + 1,
            });
        }

        ytm = next;
    }

    warn!(
        iterations = config.max_iterations,
        %ytm,
        "ytm solver exhausted its iteration budget"
    );
    Ok(SolveOutcome::DidNotConverge {
        best_estimate: ytm,
        iterations_used: config.max_iterations,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
