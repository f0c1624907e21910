//! Numeric helpers: game-accurate rounding, zero cleanup, farming level clamping,
//! and the lenient "parse or default" coercions applied at the data boundary.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Highest farming level the game allows.
pub const MAX_FARMING_LEVEL: u8 = 10;

/// Round half towards positive infinity to `decimals` places.
///
/// Matches the game's `Math.round` semantics, so `-2.5` rounds to `-2` and
/// `2.5` rounds to `3`.
pub fn round(value: Decimal, decimals: u32) -> Decimal {
    let scale = Decimal::from(10u64.pow(decimals.min(18)));
    (value * scale + Decimal::new(5, 1)).floor() / scale
}

/// Collapse negative zero and sub-1e-9 noise to exactly zero.
pub fn clean_zero(value: Decimal) -> Decimal {
    if value.abs() < Decimal::new(1, 9) {
        Decimal::ZERO
    } else {
        value
    }
}

/// Clamp any integer into the valid farming level range `[0, 10]`.
pub fn clamp_farming_level(level: i64) -> u8 {
    level.clamp(0, MAX_FARMING_LEVEL as i64) as u8
}

/// Parse a farming level from free text; non-numeric input yields level 0.
pub fn farming_level_from_text(text: &str) -> u8 {
    parse_int_prefix(text).map(clamp_farming_level).unwrap_or(0)
}

/// Parse a farming level from an arbitrary JSON value.
pub fn farming_level_from_value(value: &Value) -> u8 {
    int_from_value(value).map(clamp_farming_level).unwrap_or(0)
}

/// Parse the leading integer of `text`, the way `parseInt(text, 10)` does.
///
/// Leading whitespace and a single sign are accepted; parsing stops at the
/// first non-digit. Returns `None` when no digit is found.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate instead of failing on absurdly long digit runs.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Integer view of a JSON value: numbers truncate towards zero, strings use
/// [`parse_int_prefix`], anything else is `None`.
pub fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Decimal view of a JSON value, `Number(x) || 0` style: unparseable input is zero.
pub fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => s.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO),
        Value::Bool(true) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

/// Truthiness of a JSON value: `null`, `false`, `0`, `NaN` and `""` are false.
pub fn truthy_from_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Planting amounts: any integer below 1 (or garbage) becomes 1.
pub fn amount_from_value(value: &Value) -> u32 {
    normalize_amount(int_from_value(value).unwrap_or(1))
}

/// Coerce an integer amount into `1..=u32::MAX`.
pub fn normalize_amount(amount: i64) -> u32 {
    if amount < 1 {
        1
    } else {
        u32::try_from(amount).unwrap_or(u32::MAX)
    }
}

/// Truncate a non-negative decimal to `u32`, saturating; negatives become 0.
pub fn decimal_to_u32(value: Decimal) -> u32 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.trunc().to_u32().unwrap_or(u32::MAX)
}

/// Serde adapters that never fail on malformed scalar fields.
pub mod lenient {
    use super::*;

    /// Farming level from number, numeric string, or garbage (→ 0).
    pub fn farming_level<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        Ok(farming_level_from_value(&Value::deserialize(d)?))
    }

    /// Planting amount, at least 1.
    pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(amount_from_value(&Value::deserialize(d)?))
    }

    /// Flag from any JSON value by truthiness.
    pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(truthy_from_value(&Value::deserialize(d)?))
    }

    /// Gold value; malformed input degrades to zero.
    pub fn gold<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        Ok(decimal_from_value(&Value::deserialize(d)?))
    }

    /// Optional positive day count; absent, zero, negative, or garbage is `None`.
    pub fn positive_days<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value
            .as_ref()
            .and_then(int_from_value)
            .filter(|days| *days > 0)
            .and_then(|days| u32::try_from(days).ok()))
    }

    /// Non-negative whole count; garbage is 0.
    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(int_from_value(&value)
            .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0))
    }
}

/// Group an integer string with `,` every three digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a number with thousands separators and at most `decimals` fraction digits.
///
/// Trailing zero fraction digits are dropped: `format_number(1234.50, 2)` is `"1,234.5"`.
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let rounded = clean_zero(round(value, decimals)).normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part.filter(|f| !f.is_empty()) {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a gold amount, e.g. `"1,250g"`.
pub fn format_currency(value: Decimal, decimals: u32) -> String {
    format!("{}g", format_number(value, decimals))
}
