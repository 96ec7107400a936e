/*!
 * Amounts are exact arbitrary precision decimals end to end, rounding only
 * happens when a balance is rendered for the report.
 *
 * Note: the main amount column is parsed strictly, only the conversion
 * notes carry grouping separators ("1,000.50"), so only those get stripped.
 */
use std::str::FromStr;

use bigdecimal::{BigDecimal, ParseBigDecimalError, RoundingMode};

const REPORT_PRECISION: i64 = 2;
const GROUPING_SEPARATOR: char = ',';

/// Plain (`-0.5`) and scientific (`1.5e-7`) literals, surrounding whitespace ignored.
pub fn parse_amount(text: &str) -> Result<BigDecimal, ParseBigDecimalError> {
    BigDecimal::from_str(text.trim())
}

pub fn parse_grouped_amount(text: &str) -> Result<BigDecimal, ParseBigDecimalError> {
    let ungrouped: String = text.chars().filter(|c| *c != GROUPING_SEPARATOR).collect();
    parse_amount(&ungrouped)
}

/**
 * Half away from zero, always two fractional digits,
 * and no "-0.00" for balances that round to nothing.
 */
pub fn format_balance(value: &BigDecimal) -> String {
    let rounded = value.with_scale_round(REPORT_PRECISION, RoundingMode::HalfUp);
    // Scale is exactly REPORT_PRECISION here, so the digits are the value in hundredths
    let (hundredths, _) = rounded.as_bigint_and_exponent();
    let digits = hundredths.to_string();
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(magnitude) => ("-", magnitude),
        None => ("", digits.as_str()),
    };

    let fraction_digits = REPORT_PRECISION as usize;
    let padded = format!("{:0>width$}", magnitude, width = fraction_digits + 1);
    let (whole, fraction) = padded.split_at(padded.len() - fraction_digits);
    format!("{}{}.{}", sign, whole, fraction)
}

#[cfg(test)]
pub fn dec(text: &str) -> BigDecimal {
    text.parse().unwrap()
}
