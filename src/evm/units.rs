use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::entity::SwapError;

/// Exchange rates are stored by the swap contract as 18-decimal fixed point.
pub const RATE_DECIMALS: u8 = 18;

/// Places shown when a rate is displayed.
pub const RATE_DISPLAY_PLACES: u32 = 6;

lazy_static! {
    static ref DECIMAL_RE: Regex = Regex::new(r"^\d+(?:\.\d+)?$").unwrap();
}

/// Check that `input` is a plain non-negative decimal string ("10", "0.25").
pub fn is_decimal_string(input: &str) -> bool {
    DECIMAL_RE.is_match(input.trim())
}

/// Check a human-entered amount without knowing its decimals yet: it must be
/// a decimal string and greater than zero. Returns the trimmed input.
pub fn validate_amount(input: &str) -> Result<&str, SwapError> {
    let input = input.trim();
    if !is_decimal_string(input) {
        return Err(SwapError::InvalidAmount(format!(
            "'{}' is not a decimal number",
            input
        )));
    }
    if input.chars().all(|c| c == '0' || c == '.') {
        return Err(SwapError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(input)
}

/// Convert a human-entered amount into a fixed-point integer at `decimals`.
/// More fractional digits than `decimals` is an error, never a truncation.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, SwapError> {
    let input = input.trim();
    if !is_decimal_string(input) {
        return Err(SwapError::InvalidAmount(format!(
            "'{}' is not a decimal number",
            input
        )));
    }

    // Trailing zeros carry no value ("1.50" at one decimal is fine)
    let normalized = match input.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.len() > decimals as usize {
                return Err(SwapError::InvalidAmount(format!(
                    "'{}' has more than {} decimal places",
                    input, decimals
                )));
            }
            if fraction.is_empty() {
                integer.to_string()
            } else {
                format!("{}.{}", integer, fraction)
            }
        }
        None => input.to_string(),
    };

    let value: U256 = parse_units(&normalized, decimals)
        .map_err(|e| SwapError::InvalidAmount(format!("'{}': {}", input, e)))?
        .into();

    Ok(value)
}

/// Reject zero for amounts that are submitted on-chain.
pub fn require_positive(value: U256) -> Result<U256, SwapError> {
    if value.is_zero() {
        return Err(SwapError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

/// Format a fixed-point integer with trailing fractional zeros removed
/// ("10.0", "1.5"). The output parses back to the same integer.
pub fn format_amount(value: U256, decimals: u8) -> String {
    let formatted = match format_units(value, decimals) {
        Ok(formatted) => formatted,
        Err(_) => return value.to_string(),
    };

    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", integer)
            } else {
                format!("{}.{}", integer, fraction)
            }
        }
        None => formatted,
    }
}

/// Render an 18-decimal rate rounded to six places, e.g. "2.000000".
pub fn format_rate(raw: U256) -> String {
    let formatted = format_amount(raw, RATE_DECIMALS);

    match Decimal::from_str(&formatted) {
        Ok(rate) => format!(
            "{:.places$}",
            rate.round_dp(RATE_DISPLAY_PLACES),
            places = RATE_DISPLAY_PLACES as usize
        ),
        // Beyond Decimal's range; show the exact value instead
        Err(_) => formatted,
    }
}
