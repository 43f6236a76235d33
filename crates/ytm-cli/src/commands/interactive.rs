use colored::Colorize;
use std::io::{self, BufRead, Write};

use ytm_core::fixed_income::solver::SolverConfig;
use ytm_core::fixed_income::yields::{self, YtmInput};

use super::yields::percent_to_rate;
use crate::input::prompt::prompt_decimal;

/// Prompt for the four bond values on the terminal and print the
/// estimated yield as a percentage.
pub fn run_interactive() -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(&mut stdin.lock(), &mut stdout.lock())
}

fn run_session<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(writer, "\nFixed Income Yield to Maturity Calculator")?;
    writeln!(writer, "----------------------------------------")?;

    let face_value = prompt_decimal(reader, writer, "Enter Face Value of Bond")?;
    let coupon_pct = prompt_decimal(reader, writer, "Enter Annual Coupon Rate (in %)")?;
    let years = prompt_decimal(reader, writer, "Enter Years to Maturity")?;
    let market_price = prompt_decimal(reader, writer, "Enter Market Price of Bond")?;

    let input = YtmInput {
        face_value,
        coupon_rate: percent_to_rate(coupon_pct),
        years_to_maturity: years,
        market_price,
        solver: SolverConfig::default(),
    };
    let output = yields::calculate_ytm(&input)?;

    writeln!(
        writer,
        "\nEstimated Yield to Maturity (YTM): {}",
        output.result.ytm_display
    )?;
    for warning in &output.warnings {
        writeln!(writer, "{}: {}", "warning".yellow().bold(), warning)?;
    }
    Ok(())
}
