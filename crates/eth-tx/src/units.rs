//! Conversion between base units (wei) and human-readable decimal amounts.

use alloy_primitives::U256;

use crate::error::EthError;

/// Decimals of ether relative to wei.
pub const ETHER_DECIMALS: u8 = 18;

/// Formats a base-unit amount as a decimal string with `decimals` fractional
/// digits, trimming trailing zeros (`1500000000000000000`, 18 → `"1.5"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };

    let split = padded.len() - decimals;
    let (int_part, frac_part) = padded.split_at(split);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Parses a decimal amount into base units (`"1.5"`, 18 →
/// `1500000000000000000`).
///
/// More fractional digits than `decimals` is a format error, not a silent
/// truncation.
pub fn parse_units(text: &str, decimals: u8) -> Result<U256, EthError> {
    let text = text.trim();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(EthError::InvalidFormat(format!("not a decimal amount: {text:?}")));
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return Err(EthError::InvalidFormat(format!("not a decimal amount: {text:?}")));
    }
    if frac_part.len() > decimals as usize {
        return Err(EthError::InvalidFormat(format!(
            "{text:?} has more than {decimals} decimal places"
        )));
    }

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.push_str(&"0".repeat(decimals as usize - frac_part.len()));

    U256::from_str_radix(&digits, 10)
        .map_err(|_| EthError::ValueTooLarge(format!("{text} does not fit in 256 bits")))
}

/// Formats wei as ether.
pub fn format_ether(wei: U256) -> String {
    format_units(wei, ETHER_DECIMALS)
}

/// Parses ether into wei.
pub fn parse_ether(text: &str) -> Result<U256, EthError> {
    parse_units(text, ETHER_DECIMALS)
}
