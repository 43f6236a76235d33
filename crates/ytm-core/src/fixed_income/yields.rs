use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::pricing::{bond_price, discount_or_premium};
use super::solver::{solve_ytm, BondParams, SolveOutcome, SolverConfig};
use crate::types::{format_percent, with_metadata, ComputationOutput, Money, Rate, Years};
use crate::YtmResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Input for yield-to-maturity calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtmInput {
    /// Face (par) value of the bond.
    pub face_value: Money,
    /// Coupon rate per period as a decimal (e.g. 0.05 = 5%).
    pub coupon_rate: Rate,
    /// Number of annual periods until maturity.
    pub years_to_maturity: Years,
    /// Observed market price of the bond.
    pub market_price: Money,
    /// Newton-Raphson settings; omitted fields take their defaults.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl YtmInput {
    pub fn params(&self) -> BondParams {
        BondParams {
            face_value: self.face_value,
            coupon_rate: self.coupon_rate,
            years_to_maturity: self.years_to_maturity,
            market_price: self.market_price,
        }
    }
}

/// Output of yield-to-maturity calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtmOutput {
    /// Yield to maturity as a decimal.
    pub ytm: Rate,
    /// Yield to maturity as a percentage string, e.g. "5.6690%".
    pub ytm_display: String,
    /// Annual coupon / market price.
    pub current_yield: Rate,
    pub discount_or_premium: String,
    /// Price implied by the returned yield.
    pub model_price: Money,
    /// model_price - market_price.
    pub pricing_error: Money,
    /// Solver status, iteration count and status-specific detail.
    pub outcome: SolveOutcome,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for yield to maturity and report the solve alongside current
/// yield and the premium/discount classification.
pub fn calculate_ytm(input: &YtmInput) -> YtmResult<ComputationOutput<YtmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = input.params();
    let outcome = solve_ytm(&params, &input.solver)?;
    let ytm = outcome.ytm();

    match &outcome {
        SolveOutcome::Converged { .. } => {}
        SolveOutcome::Stagnated {
            iterations,
            derivative,
            ..
        } => warnings.push(format!(
            "Price derivative {derivative} fell below {} after {iterations} iterations; \
             yield is unrefined",
            input.solver.stagnation_epsilon
        )),
        SolveOutcome::DidNotConverge {
            iterations_used, ..
        } => warnings.push(format!(
            "YTM did not converge within {iterations_used} iterations; \
             returning last estimate"
        )),
    }

    if !input.years_to_maturity.fract().is_zero() {
        warnings.push(format!(
            "Fractional maturity {}: coupons paid for {} whole periods",
            input.years_to_maturity,
            input.years_to_maturity.trunc()
        ));
    }

    let model_price = bond_price(
        input.face_value,
        input.coupon_rate,
        input.years_to_maturity,
        ytm,
    )?;
    let current_yield = current_yield(input.face_value, input.coupon_rate, input.market_price)
        .unwrap_or(Decimal::ZERO);

    let output = YtmOutput {
        ytm,
        ytm_display: format_percent(ytm),
        current_yield,
        discount_or_premium: discount_or_premium(input.market_price, input.face_value)
            .to_string(),
        model_price,
        pricing_error: model_price - input.market_price,
        outcome,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": "Newton-Raphson",
        "initial_guess": input.solver.initial_guess.to_string(),
        "tolerance": input.solver.tolerance.to_string(),
        "max_iterations": input.solver.max_iterations,
        "stagnation_epsilon": input.solver.stagnation_epsilon.to_string(),
        "compounding": "annual",
    });

    Ok(with_metadata(
        "Yield to Maturity (Newton-Raphson on discounted cash flows)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Current yield = annual coupon / market price.
pub fn current_yield(face_value: Money, coupon_rate: Rate, market_price: Money) -> Option<Rate> {
    if market_price.is_zero() {
        return None;
    }
    Some(face_value * coupon_rate / market_price)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
