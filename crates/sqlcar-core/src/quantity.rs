//! Resource quantity parsing
//!
//! Quantities are the strings Kubernetes uses for CPU and memory amounts:
//! a decimal number followed by an optional suffix.
//!
//! - Binary SI: `Ki`, `Mi`, `Gi`, `Ti`, `Pi`, `Ei` (`128Mi` = 134217728)
//! - Decimal SI: `n`, `u`, `m`, `k`, `M`, `G`, `T`, `P`, `E` (`5m` = 0.005)
//! - Decimal exponent: `e3`, `E-2` (`1e3` = 1000)
//!
//! The numeric value is held in nano-units so that both `5m` of CPU and
//! `8Mi` of memory are exact.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{CoreError, Result};

/// Sign, then a decimal number (`5`, `0.5`, `.5`, `1.`), then whatever is left as suffix
static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(.*)$").expect("quantity regex is valid")
});

static EXPONENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[eE]([+-]?[0-9]+)$").expect("exponent regex is valid"));

const NANOS_PER_UNIT: i128 = 1_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// How a suffix scales the number in front of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    /// Multiply by 10^n
    Decimal(i32),
    /// Multiply by 2^n
    Binary(u32),
}

fn scale_for_suffix(suffix: &str) -> Option<Scale> {
    let scale = match suffix {
        "" => Scale::Decimal(0),
        "n" => Scale::Decimal(-9),
        "u" => Scale::Decimal(-6),
        "m" => Scale::Decimal(-3),
        "k" => Scale::Decimal(3),
        "M" => Scale::Decimal(6),
        "G" => Scale::Decimal(9),
        "T" => Scale::Decimal(12),
        "P" => Scale::Decimal(15),
        "E" => Scale::Decimal(18),
        "Ki" => Scale::Binary(10),
        "Mi" => Scale::Binary(20),
        "Gi" => Scale::Binary(30),
        "Ti" => Scale::Binary(40),
        "Pi" => Scale::Binary(50),
        "Ei" => Scale::Binary(60),
        other => {
            let caps = EXPONENT_REGEX.captures(other)?;
            Scale::Decimal(caps[1].parse().ok()?)
        }
    };
    Some(scale)
}

/// A parsed resource quantity
///
/// Serializes back to the exact (trimmed) string it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quantity {
    raw: String,
    nanos: i128,
}

impl Quantity {
    /// Parse a quantity string such as `100m`, `1.5`, `128Mi` or `1e3`
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::quantity(value, "quantity is empty"));
        }

        let caps = QUANTITY_REGEX.captures(trimmed).ok_or_else(|| {
            CoreError::quantity(value, "expected a number followed by an optional unit")
        })?;

        let negative = &caps[1] == "-";
        let number = &caps[2];
        let suffix = &caps[3];

        let scale = scale_for_suffix(suffix).ok_or_else(|| {
            CoreError::quantity(value, format!("unrecognized unit suffix '{}'", suffix))
        })?;

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        let digits = format!("{}{}", int_part, frac_part);
        let mantissa: i128 = digits
            .parse()
            .map_err(|_| CoreError::quantity(value, "number is too large"))?;
        let frac_len = frac_part.len() as i32;

        let magnitude = match scale {
            Scale::Decimal(exp) => scale_decimal(mantissa, exp - frac_len + 9),
            Scale::Binary(bits) => mantissa
                .checked_mul(1i128 << bits)
                .and_then(|m| m.checked_mul(NANOS_PER_UNIT))
                .and_then(|m| scale_decimal(m, -frac_len)),
        }
        .ok_or_else(|| CoreError::quantity(value, "value is out of range"))?;

        Ok(Self {
            raw: trimmed.to_string(),
            nanos: if negative { -magnitude } else { magnitude },
        })
    }

    /// The string this quantity was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Value in nano-units (`5m` is 5_000_000)
    pub fn as_nanos(&self) -> i128 {
        self.nanos
    }

    /// Value in milli-units, rounded up (`5m` is 5, `1` is 1000)
    pub fn as_milli(&self) -> i128 {
        ceil_div(self.nanos, NANOS_PER_MILLI)
    }

    /// Value in whole units, rounded up (`128Mi` is 134217728, `5m` is 1)
    pub fn as_units(&self) -> i128 {
        ceil_div(self.nanos, NANOS_PER_UNIT)
    }
}

/// mantissa * 10^exp, rounding up when exp is negative
fn scale_decimal(mantissa: i128, exp: i32) -> Option<i128> {
    if exp >= 0 {
        10i128
            .checked_pow(exp as u32)
            .and_then(|factor| mantissa.checked_mul(factor))
    } else {
        match 10i128.checked_pow(exp.unsigned_abs()) {
            Some(divisor) => Some(ceil_div(mantissa, divisor)),
            // Anything this small rounds up to a single nano-unit
            None => Some(if mantissa > 0 { 1 } else { 0 }),
        }
    }
}

fn ceil_div(value: i128, divisor: i128) -> i128 {
    -((-value).div_euclid(divisor))
}

impl FromStr for Quantity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Quantity {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Quantity> for String {
    fn from(quantity: Quantity) -> Self {
        quantity.raw
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(value: &str) -> Quantity {
        Quantity::parse(value).unwrap()
    }

    #[test]
    fn test_parse_default_sidecar_quantities() {
        assert_eq!(q("5m").as_milli(), 5);
        assert_eq!(q("100m").as_milli(), 100);
        assert_eq!(q("8Mi").as_units(), 8 * 1024 * 1024);
        assert_eq!(q("128Mi").as_units(), 134_217_728);
    }

    #[test]
    fn test_parse_plain_and_fractional_numbers() {
        assert_eq!(q("1").as_milli(), 1000);
        assert_eq!(q("0.5").as_milli(), 500);
        assert_eq!(q(".5").as_milli(), 500);
        assert_eq!(q("1.").as_milli(), 1000);
        assert_eq!(q("1.5Gi").as_units(), 1_610_612_736);
    }

    #[test]
    fn test_parse_decimal_suffixes() {
        assert_eq!(q("1k").as_units(), 1000);
        assert_eq!(q("2M").as_units(), 2_000_000);
        assert_eq!(q("1G").as_units(), 1_000_000_000);
        assert_eq!(q("250u").as_nanos(), 250_000);
        assert_eq!(q("7n").as_nanos(), 7);
    }

    #[test]
    fn test_parse_binary_suffixes() {
        assert_eq!(q("1Ki").as_units(), 1024);
        assert_eq!(q("1Gi").as_units(), 1 << 30);
        assert_eq!(q("1Ei").as_units(), 1 << 60);
    }

    #[test]
    fn test_parse_exponent() {
        assert_eq!(q("1e3").as_units(), 1000);
        assert_eq!(q("5E-3").as_milli(), 5);
        // A bare E is the exa suffix, not an exponent
        assert_eq!(q("1E").as_units(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_parse_rounds_up() {
        // 1/3 of a nano-unit is not representable
        assert_eq!(q("0.5n").as_nanos(), 1);
        assert_eq!(q("5m").as_units(), 1);
        assert_eq!(q("1500u").as_milli(), 2);
    }

    #[test]
    fn test_parse_sign_and_whitespace() {
        assert_eq!(q("-100m").as_milli(), -100);
        assert_eq!(q("+2").as_units(), 2);
        let padded = q("  64Mi ");
        assert_eq!(padded.as_str(), "64Mi");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "   ", "Mi", "5x", "5MiB", "abc", "1.2.3", "--1", "5 m", "e3", "1e"] {
            let err = Quantity::parse(bad).unwrap_err();
            assert!(
                matches!(err, CoreError::QuantityParse { .. }),
                "expected quantity error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let err = Quantity::parse("99999999999999999999999999999999999999999").unwrap_err();
        assert!(matches!(err, CoreError::QuantityParse { .. }));

        let err = Quantity::parse("1e40").unwrap_err();
        assert!(matches!(err, CoreError::QuantityParse { .. }));
    }

    #[test]
    fn test_parse_long_binary_fraction() {
        let tiny = format!("0.{}1Ki", "0".repeat(38));
        assert_eq!(q(&tiny).as_nanos(), 1);
        assert_eq!(q(&tiny).as_str(), tiny);

        let tiny = format!("0.{}1Mi", "0".repeat(37));
        assert_eq!(q(&tiny).as_nanos(), 1);

        assert_eq!(q("0.0000000001Ki").as_nanos(), 103);
    }

    #[test]
    fn test_error_message() {
        let err = Quantity::parse("5x").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Invalid quantity '5x': unrecognized unit suffix 'x'");
    }

    #[test]
    fn test_serde_uses_original_string() {
        let quantity = q("128Mi");
        assert_eq!(quantity.to_string(), "128Mi");

        let yaml = serde_yaml::to_string(&quantity).unwrap();
        assert_eq!(yaml.trim(), "128Mi");

        let parsed: Quantity = serde_yaml::from_str("\"100m\"").unwrap();
        assert_eq!(parsed.as_milli(), 100);

        assert!(serde_yaml::from_str::<Quantity>("\"12parsecs\"").is_err());
    }
}
