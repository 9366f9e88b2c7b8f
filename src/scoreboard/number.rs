//! Normalization of raw feed values.
//!
//! Feed cells are either numbers (optionally comma-grouped, optionally money)
//! or free text such as comma-separated donor names. Every input maps to
//! exactly one [`NumericCell`].

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::domain::{Amount, NumericCell};

/// Fractional digits shown for non-integer and currency values
const DISPLAY_DP: u32 = 2;

/// Normalize a raw cell value.
///
/// Rounding is half away from zero at two decimal places. Currency values
/// always show two fractional digits; other values drop trailing zeros.
pub fn normalize(raw: &str, is_currency: bool) -> NumericCell {
    match parse_number(raw) {
        Some(value) => NumericCell::Numeric {
            display: format_display(value, is_currency),
            value,
        },
        None => NumericCell::MultiLabel {
            parts: split_labels(raw),
        },
    }
}

/// Numeric interpretation of a raw value, ignoring whitespace and commas.
///
/// Magnitudes outside `Decimal`'s range fall back to `f64`.
pub fn parse_number(raw: &str) -> Option<Amount> {
    let stripped: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if stripped.is_empty() || stripped.contains('_') {
        return None;
    }

    match Decimal::from_str(&stripped).or_else(|_| Decimal::from_scientific(&stripped)) {
        Ok(value) => Some(Amount::Exact(value)),
        Err(_) => f64::from_str(&stripped).ok().and_then(Amount::wide),
    }
}

/// Display form of a parsed value
pub fn format_display(value: Amount, is_currency: bool) -> String {
    let text = match value {
        Amount::Exact(value) => exact_text(value, is_currency),
        Amount::Wide(value) => wide_text(value, is_currency),
    };
    group_digits(&text)
}

fn exact_text(value: Decimal, is_currency: bool) -> String {
    let mut rounded =
        value.round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }

    if !is_currency {
        return rounded.normalize().to_string();
    }
    // rescale stops short of the requested scale when the mantissa would overflow
    rounded.rescale(DISPLAY_DP);
    let mut text = rounded.to_string();
    let missing = DISPLAY_DP.saturating_sub(rounded.scale());
    if missing > 0 {
        if rounded.scale() == 0 {
            text.push('.');
        }
        text.extend(std::iter::repeat('0').take(missing as usize));
    }
    text
}

fn wide_text(value: f64, is_currency: bool) -> String {
    let mut rounded = if value.fract() == 0.0 {
        value
    } else {
        (value * 100.0).round() / 100.0
    };
    // drop negative zero
    if rounded == 0.0 {
        rounded = 0.0;
    }

    if is_currency {
        format!("{rounded:.2}")
    } else {
        rounded.to_string()
    }
}

/// Insert thousands separators into the integer portion of `number`.
pub fn group_digits(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(number.len() + int_part.len() / 3);
    grouped.push_str(sign);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',').map(|part| part.trim().to_string()).collect()
}
