use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tracing::debug;

use ytm_core::fixed_income::pricing::{self, BondPriceInput};
use ytm_core::fixed_income::solver::SolverConfig;
use ytm_core::fixed_income::yields::{self, YtmInput};

use crate::input;

/// Arguments for yield-to-maturity solve
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SolveArgs {
    /// Face (par) value of the bond
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate in percent (e.g. 5 for 5%)
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Years to maturity (whole years are coupon periods)
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Observed market price
    #[arg(long)]
    pub market_price: Option<Decimal>,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Path to JSON or YAML input file (overrides individual bond flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Newton-Raphson overrides, applied on top of file or stdin input
#[derive(Args)]
pub struct SolverArgs {
    /// Starting yield as a decimal [default: 0.05]
    #[arg(long)]
    pub initial_guess: Option<Decimal>,

    /// Convergence threshold between successive estimates [default: 0.000001]
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Iteration budget [default: 100]
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Derivative floor below which the solver stops [default: 0.0000000001]
    #[arg(long)]
    pub stagnation_epsilon: Option<Decimal>,
}

impl SolverArgs {
    fn apply(&self, config: &mut SolverConfig) {
        if let Some(v) = self.initial_guess {
            config.initial_guess = v;
        }
        if let Some(v) = self.tolerance {
            config.tolerance = v;
        }
        if let Some(v) = self.max_iterations {
            config.max_iterations = v;
        }
        if let Some(v) = self.stagnation_epsilon {
            config.stagnation_epsilon = v;
        }
    }
}

/// Arguments for pricing a bond off a yield
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PriceArgs {
    /// Face (par) value of the bond
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate in percent (e.g. 5 for 5%)
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Years to maturity
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Yield as a decimal (e.g. 0.056 for 5.6%)
    #[arg(long = "yield")]
    pub yield_rate: Option<Decimal>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Coupon rates arrive on the command line as percentages.
pub fn percent_to_rate(pct: Decimal) -> Decimal {
    pct / dec!(100)
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut ytm_input: YtmInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        YtmInput {
            face_value: args
                .face_value
                .ok_or("--face-value is required (or provide --input)")?,
            coupon_rate: percent_to_rate(
                args.coupon_rate
                    .ok_or("--coupon-rate is required (or provide --input)")?,
            ),
            years_to_maturity: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            market_price: args
                .market_price
                .ok_or("--market-price is required (or provide --input)")?,
            solver: SolverConfig::default(),
        }
    };
    args.solver.apply(&mut ytm_input.solver);
    debug!(
        face_value = %ytm_input.face_value,
        coupon_rate = %ytm_input.coupon_rate,
        years = %ytm_input.years_to_maturity,
        market_price = %ytm_input.market_price,
        "solving yield to maturity"
    );

    let result = yields::calculate_ytm(&ytm_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let price_input: BondPriceInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        BondPriceInput {
            face_value: args
                .face_value
                .ok_or("--face-value is required (or provide --input)")?,
            coupon_rate: percent_to_rate(
                args.coupon_rate
                    .ok_or("--coupon-rate is required (or provide --input)")?,
            ),
            years_to_maturity: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            yield_rate: args
                .yield_rate
                .ok_or("--yield is required (or provide --input)")?,
        }
    };

    let result = pricing::price_bond(&price_input)?;
    Ok(serde_json::to_value(result)?)
}
