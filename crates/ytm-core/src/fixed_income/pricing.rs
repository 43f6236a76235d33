//! Present-value pricing of a fixed-coupon bullet bond and its analytic
//! first derivative with respect to yield.
//!
//! Both functions discount one coupon per whole period and repay the face
//! value once, discounted by the full (possibly fractional) maturity.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::YtmError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::YtmResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Input for pricing a bond off a flat yield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceInput {
    /// Face (par) value of the bond.
    pub face_value: Money,
    /// Coupon rate per period as a decimal (e.g. 0.05 = 5%).
    pub coupon_rate: Rate,
    /// Number of annual periods until maturity.
    pub years_to_maturity: Years,
    /// Flat yield used for discounting, as a decimal.
    #[serde(rename = "yield", alias = "yield_rate")]
    pub yield_rate: Rate,
}

/// Output of bond pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceOutput {
    /// Present value of all cash flows.
    pub price: Money,
    /// dP/dy, always negative for positive cash flows.
    pub price_derivative: Decimal,
    /// -(dP/dy) / P.
    pub modified_duration: Decimal,
    /// Modified duration scaled by (1 + y).
    pub macaulay_duration: Decimal,
    pub discount_or_premium: String,
}

// ---------------------------------------------------------------------------
// Public API — pricing function and derivative
// ---------------------------------------------------------------------------

/// Theoretical price of the bond at `yield_rate`:
///   P = sum_{t=1}^{n} C / (1+y)^t + F / (1+y)^years
/// where C = F * coupon_rate and n = trunc(years).
pub fn bond_price(
    face_value: Money,
    coupon_rate: Rate,
    years: Years,
    yield_rate: Rate,
) -> YtmResult<Money> {
    let v = discount_rate_factor(yield_rate)?;
    let coupon = face_value * coupon_rate;
    let n = coupon_periods(years)?;

    let mut price = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for t in 1..=n {
        discount = compound(discount, v, t)?;
        price += checked_mul(coupon, discount, "coupon discounting")?;
    }

    let final_discount = principal_discount(v, years, discount)?;
    price += checked_mul(face_value, final_discount, "principal discounting")?;

    Ok(price)
}

/// Analytic derivative of [`bond_price`] with respect to yield:
///   dP/dy = -sum_{t=1}^{n} t*C / (1+y)^{t+1} - years*F / (1+y)^{years+1}
pub fn bond_price_derivative(
    face_value: Money,
    coupon_rate: Rate,
    years: Years,
    yield_rate: Rate,
) -> YtmResult<Decimal> {
    let v = discount_rate_factor(yield_rate)?;
    let coupon = face_value * coupon_rate;
    let n = coupon_periods(years)?;

    let mut derivative = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for t in 1..=n {
        discount = compound(discount, v, t)?;
        let next = compound(discount, v, t + 1)?;
        derivative -= checked_mul(Decimal::from(t) * coupon, next, "coupon sensitivity")?;
    }

    let principal_next = checked_mul(
        principal_discount(v, years, discount)?,
        v,
        "principal sensitivity",
    )?;
    derivative -= checked_mul(years * face_value, principal_next, "principal sensitivity")?;

    Ok(derivative)
}

// ---------------------------------------------------------------------------
// Public API — pricing analytics
// ---------------------------------------------------------------------------

/// Price a bond off a flat yield and report its rate sensitivity.
pub fn price_bond(input: &BondPriceInput) -> YtmResult<ComputationOutput<BondPriceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_bond_terms(input.face_value, input.coupon_rate, input.years_to_maturity)?;
    if input.yield_rate <= -Decimal::ONE {
        return Err(YtmError::InvalidInput {
            field: "yield".into(),
            reason: "Yield must be greater than -100%".into(),
        });
    }

    let price = bond_price(
        input.face_value,
        input.coupon_rate,
        input.years_to_maturity,
        input.yield_rate,
    )?;
    let price_derivative = bond_price_derivative(
        input.face_value,
        input.coupon_rate,
        input.years_to_maturity,
        input.yield_rate,
    )?;

    let modified_duration = if price.is_zero() {
        warnings.push("Price is zero; duration is undefined".into());
        Decimal::ZERO
    } else {
        -price_derivative / price
    };
    let macaulay_duration = modified_duration * (Decimal::ONE + input.yield_rate);

    if !input.years_to_maturity.fract().is_zero() {
        warnings.push(format!(
            "Fractional maturity {}: coupons paid for {} whole periods",
            input.years_to_maturity,
            input.years_to_maturity.trunc()
        ));
    }

    let output = BondPriceOutput {
        price,
        price_derivative,
        modified_duration,
        macaulay_duration,
        discount_or_premium: discount_or_premium(price, input.face_value).to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "annual",
        "coupon_periods": "whole years (truncated)",
        "principal_discount": "full maturity exponent"
    });

    Ok(with_metadata(
        "Discounted Cash Flow Bond Pricing",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Classify a price against face value.
pub fn discount_or_premium(price: Money, face_value: Money) -> &'static str {
    if price > face_value {
        "premium"
    } else if price < face_value {
        "discount"
    } else {
        "par"
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Shared validation of the contractual bond terms.
pub(crate) fn validate_bond_terms(
    face_value: Money,
    coupon_rate: Rate,
    years: Years,
) -> YtmResult<()> {
    if face_value <= Decimal::ZERO {
        return Err(YtmError::InvalidInput {
            field: "face_value".into(),
            reason: "Face value must be positive".into(),
        });
    }
    if coupon_rate < Decimal::ZERO || coupon_rate > Decimal::ONE {
        return Err(YtmError::InvalidInput {
            field: "coupon_rate".into(),
            reason: "Coupon rate must be a decimal between 0 and 1".into(),
        });
    }
    if years <= Decimal::ZERO {
        return Err(YtmError::InvalidInput {
            field: "years_to_maturity".into(),
            reason: "Years to maturity must be positive".into(),
        });
    }
    Ok(())
}

/// One-period discount factor v = 1 / (1 + y). Discounting multiplies by
/// powers of v, which shrink toward zero for positive yields instead of
/// growing past the Decimal range.
fn discount_rate_factor(yield_rate: Rate) -> YtmResult<Decimal> {
    let one_plus_y = Decimal::ONE + yield_rate;
    if one_plus_y <= Decimal::ZERO {
        return Err(YtmError::InvalidInput {
            field: "yield".into(),
            reason: format!("Yield {yield_rate} must be greater than -100%"),
        });
    }
    Decimal::ONE
        .checked_div(one_plus_y)
        .ok_or_else(|| overflow("one-period discount factor"))
}

/// Whole coupon periods; non-positive maturities pay no coupons.
fn coupon_periods(years: Years) -> YtmResult<u32> {
    if years <= Decimal::ZERO {
        return Ok(0);
    }
    years.trunc().to_u32().ok_or_else(|| YtmError::InvalidInput {
        field: "years_to_maturity".into(),
        reason: format!("{years} years exceeds the supported number of periods"),
    })
}

/// v^years, reusing the accumulated whole-period factor when possible.
fn principal_discount(v: Decimal, years: Years, accumulated: Decimal) -> YtmResult<Decimal> {
    if years >= Decimal::ZERO && years.fract().is_zero() {
        return Ok(accumulated);
    }
    v.checked_powd(years)
        .ok_or_else(|| overflow("fractional principal discount"))
}

fn compound(discount: Decimal, v: Decimal, period: u32) -> YtmResult<Decimal> {
    discount
        .checked_mul(v)
        .ok_or_else(|| overflow(&format!("discount factor at period {period}")))
}

fn checked_mul(amount: Decimal, factor: Decimal, context: &str) -> YtmResult<Decimal> {
    amount
        .checked_mul(factor)
        .ok_or_else(|| overflow(context))
}

fn overflow(context: &str) -> YtmError {
    YtmError::NumericalOverflow {
        context: context.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TIGHT: Decimal = dec!(0.000000000001);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual} (tol {tol})"
        );
    }

    #[test]
    fn test_single_period_is_one_discounted_cash_flow() {
        let price = bond_price(dec!(1000), dec!(0.05), dec!(1), dec!(0.10)).unwrap();
        // 1000 * 1.05 / 1.10
        assert_close(price, dec!(1050) / dec!(1.10), TIGHT);
    }

    #[test]
    fn test_par_bond_prices_at_face() {
        let price = bond_price(dec!(1000), dec!(0.08), dec!(5), dec!(0.08)).unwrap();
        assert_close(price, dec!(1000), TIGHT);
    }

    #[test]
    fn test_zero_coupon_bond() {
        let price = bond_price(dec!(1000), Decimal::ZERO, dec!(2), dec!(0.10)).unwrap();
        assert_close(price, dec!(1000) / dec!(1.21), TIGHT);
    }

    #[test]
    fn test_ten_year_discount_bond_near_950() {
        // 5% coupon priced at 5.6% sits a few units above 950
        let price = bond_price(dec!(1000), dec!(0.05), dec!(10), dec!(0.056)).unwrap();
        assert!(price > dec!(950) && price < dec!(960), "got {price}");
    }

    #[test]
    fn test_price_strictly_decreasing_in_yield() {
        let yields = [
            dec!(-0.5),
            dec!(-0.01),
            dec!(0),
            dec!(0.01),
            dec!(0.05),
            dec!(0.1),
            dec!(0.25),
            dec!(0.5),
            dec!(1.0),
        ];
        let prices: Vec<Decimal> = yields
            .iter()
            .map(|y| bond_price(dec!(1000), dec!(0.06), dec!(7), *y).unwrap())
            .collect();
        for w in prices.windows(2) {
            assert!(w[1] < w[0], "price not decreasing: {} then {}", w[0], w[1]);
        }
    }

    #[test]
    fn test_fractional_years_truncate_coupons_only() {
        let price = bond_price(dec!(100), dec!(0.05), dec!(2.5), dec!(0.05)).unwrap();
        let coupons = dec!(5) / dec!(1.05) + dec!(5) / dec!(1.1025);
        let principal = dec!(100) / dec!(1.05).powd(dec!(2.5));
        assert_close(price, coupons + principal, dec!(0.000001));
    }

    #[test]
    fn test_zero_yield_sums_cash_flows() {
        let price = bond_price(dec!(1000), dec!(0.04), dec!(3), Decimal::ZERO).unwrap();
        assert_eq!(price, dec!(1120));
    }

    #[test]
    fn test_yield_at_or_below_minus_one_rejected() {
        for y in [dec!(-1), dec!(-1.5)] {
            match bond_price(dec!(1000), dec!(0.05), dec!(5), y) {
                Err(YtmError::InvalidInput { field, .. }) => assert_eq!(field, "yield"),
                other => panic!("expected InvalidInput on yield, got {other:?}"),
            }
            assert!(bond_price_derivative(dec!(1000), dec!(0.05), dec!(5), y).is_err());
        }
    }

    #[test]
    fn test_discount_factor_overflow_is_reported() {
        // v = 20 at y = -0.95, so v^40 is beyond the Decimal range
        let result = bond_price(dec!(1000), dec!(0.05), dec!(40), dec!(-0.95));
        assert!(matches!(result, Err(YtmError::NumericalOverflow { .. })));
    }

    #[test]
    fn test_long_dated_bond_prices_without_overflow() {
        // 2000 annual coupons at the coupon rate: price is face value
        let par = bond_price(dec!(1000), dec!(0.05), dec!(2000), dec!(0.05)).unwrap();
        assert_close(par, dec!(1000), dec!(0.000001));

        // 200 years at 50%: effectively a perpetuity worth C / y = 100
        let steep = bond_price(dec!(1000), dec!(0.05), dec!(200), dec!(0.5)).unwrap();
        assert_close(steep, dec!(100), dec!(0.000001));

        let d = bond_price_derivative(dec!(1000), dec!(0.05), dec!(200), dec!(0.5)).unwrap();
        // perpetuity sensitivity -C / y^2 = -200
        assert_close(d, dec!(-200), dec!(0.000001));
    }

    #[test]
    fn test_derivative_single_period() {
        // d/dy [1050 / (1+y)] = -1050 / (1+y)^2
        let d = bond_price_derivative(dec!(1000), dec!(0.05), dec!(1), dec!(0.10)).unwrap();
        assert_close(d, -dec!(1050) / dec!(1.21), TIGHT);
    }

    #[test]
    fn test_derivative_negative_for_positive_yield() {
        for y in [dec!(0.001), dec!(0.05), dec!(0.3)] {
            let d = bond_price_derivative(dec!(1000), dec!(0.05), dec!(10), y).unwrap();
            assert!(d < Decimal::ZERO, "derivative {d} at {y}");
        }
    }

    #[test]
    fn test_derivative_matches_central_difference() {
        let h = dec!(0.000001);
        let y = dec!(0.067);
        let up = bond_price(dec!(1000), dec!(0.045), dec!(12), y + h).unwrap();
        let down = bond_price(dec!(1000), dec!(0.045), dec!(12), y - h).unwrap();
        let numeric = (up - down) / (dec!(2) * h);
        let analytic = bond_price_derivative(dec!(1000), dec!(0.045), dec!(12), y).unwrap();
        assert_close(analytic, numeric, dec!(0.01));
    }

    #[test]
    fn test_derivative_fractional_years() {
        let h = dec!(0.0001);
        let y = dec!(0.04);
        let up = bond_price(dec!(100), dec!(0.03), dec!(3.5), y + h).unwrap();
        let down = bond_price(dec!(100), dec!(0.03), dec!(3.5), y - h).unwrap();
        let numeric = (up - down) / (dec!(2) * h);
        let analytic = bond_price_derivative(dec!(100), dec!(0.03), dec!(3.5), y).unwrap();
        assert_close(analytic, numeric, dec!(0.01));
    }

    #[test]
    fn test_price_bond_par_durations() {
        let input = BondPriceInput {
            face_value: dec!(1000),
            coupon_rate: dec!(0.08),
            years_to_maturity: dec!(5),
            yield_rate: dec!(0.08),
        };
        let out = price_bond(&input).unwrap();
        let r = &out.result;
        assert_close(r.price, dec!(1000), TIGHT);
        assert_eq!(r.discount_or_premium, "par");
        // Macaulay duration of a 5y 8% par bond is ~4.312
        assert_close(r.macaulay_duration, dec!(4.3121), dec!(0.001));
        assert_close(
            r.modified_duration * dec!(1.08),
            r.macaulay_duration,
            TIGHT,
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_price_bond_zero_coupon_macaulay_equals_maturity() {
        let input = BondPriceInput {
            face_value: dec!(100),
            coupon_rate: Decimal::ZERO,
            years_to_maturity: dec!(7),
            yield_rate: dec!(0.03),
        };
        let out = price_bond(&input).unwrap();
        assert_close(out.result.macaulay_duration, dec!(7), dec!(0.0000001));
        assert_eq!(out.result.discount_or_premium, "discount");
    }

    #[test]
    fn test_price_bond_warns_on_fractional_maturity() {
        let input = BondPriceInput {
            face_value: dec!(100),
            coupon_rate: dec!(0.05),
            years_to_maturity: dec!(2.5),
            yield_rate: dec!(0.02),
        };
        let out = price_bond(&input).unwrap();
        assert_eq!(out.result.discount_or_premium, "premium");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_price_bond_validation() {
        let base = BondPriceInput {
            face_value: dec!(1000),
            coupon_rate: dec!(0.05),
            years_to_maturity: dec!(10),
            yield_rate: dec!(0.05),
        };

        let mut bad = base.clone();
        bad.face_value = Decimal::ZERO;
        assert!(price_bond(&bad).is_err());

        let mut bad = base.clone();
        bad.years_to_maturity = Decimal::ZERO;
        assert!(price_bond(&bad).is_err());

        let mut bad = base.clone();
        bad.coupon_rate = dec!(1.5);
        assert!(price_bond(&bad).is_err());

        let mut bad = base;
        bad.yield_rate = dec!(-1);
        assert!(price_bond(&bad).is_err());
    }

    #[test]
    fn test_price_input_accepts_yield_key() {
        let input: BondPriceInput = serde_json::from_value(serde_json::json!({
            "face_value": "1000",
            "coupon_rate": "0.05",
            "years_to_maturity": "10",
            "yield": "0.05"
        }))
        .unwrap();
        assert_eq!(input.yield_rate, dec!(0.05));
    }
}
