//! Fixed high-precision decimal numbers.
//!
//! A decimal is `mantissa * 10^exponent` with a 128-bit signed mantissa
//! (38 significant digits). Values are always normalized: the mantissa has
//! no trailing zero digits and zero is `{0, 0}`. Because of that, derived
//! equality and hashing are numeric equality (`2` == `2.0`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::DecimalParseError;

/// Most filler zeros [`Decimal`]'s `Display` writes before switching to
/// exponent notation.
pub const MAX_PADDING_ZEROS: usize = 32;

/// A normalized base-10 decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    exponent: i32,
}

impl Decimal {
    /// The zero decimal.
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        exponent: 0,
    };

    /// Creates `mantissa * 10^exponent`, normalizing trailing zeros away.
    pub fn new(mantissa: i128, exponent: i32) -> Self {
        if mantissa == 0 {
            return Self::ZERO;
        }
        let mut mantissa = mantissa;
        let mut exponent = exponent;
        while mantissa % 10 == 0 && exponent < i32::MAX {
            mantissa /= 10;
            exponent += 1;
        }
        Self { mantissa, exponent }
    }

    /// Returns the normalized mantissa.
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Returns the base-10 exponent.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Returns true if this is zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Returns true if this is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Negation, `None` if the mantissa cannot be negated.
    pub fn checked_neg(self) -> Option<Decimal> {
        Some(Self {
            mantissa: self.mantissa.checked_neg()?,
            exponent: self.exponent,
        })
    }

    /// Exact addition, `None` on overflow.
    pub fn checked_add(self, other: Decimal) -> Option<Decimal> {
        if self.is_zero() {
            return Some(other);
        }
        if other.is_zero() {
            return Some(self);
        }
        let exponent = self.exponent.min(other.exponent);
        let lhs = rescale(self, exponent)?;
        let rhs = rescale(other, exponent)?;
        Some(Decimal::new(lhs.checked_add(rhs)?, exponent))
    }

    /// Exact subtraction, `None` on overflow.
    pub fn checked_sub(self, other: Decimal) -> Option<Decimal> {
        self.checked_add(other.checked_neg()?)
    }
}

/// Returns the mantissa of `value` expressed at the (smaller) `exponent`.
fn rescale(value: Decimal, exponent: i32) -> Option<i128> {
    let shift = u32::try_from(value.exponent as i64 - exponent as i64).ok()?;
    value.mantissa.checked_mul(10i128.checked_pow(shift)?)
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value as i128, 0)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::new(value as i128, 0)
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.mantissa.signum().cmp(&other.mantissa.signum());
        if sign != Ordering::Equal || self.mantissa == 0 {
            return sign;
        }

        let magnitude = compare_magnitude(self, other);
        if self.mantissa < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares absolute values of two non-zero decimals without rescaling.
fn compare_magnitude(a: &Decimal, b: &Decimal) -> Ordering {
    let a_digits = a.mantissa.unsigned_abs().to_string();
    let b_digits = b.mantissa.unsigned_abs().to_string();

    // Position of the leading digit decides first.
    let a_lead = a.exponent as i64 + a_digits.len() as i64;
    let b_lead = b.exponent as i64 + b_digits.len() as i64;
    if a_lead != b_lead {
        return a_lead.cmp(&b_lead);
    }

    let width = a_digits.len().max(b_digits.len());
    let a_padded = format!("{:0<width$}", a_digits, width = width);
    let b_padded = format!("{:0<width$}", b_digits, width = width);
    a_padded.cmp(&b_padded)
}

impl fmt::Display for Decimal {
    /// Plain notation, or `<digits>E<exponent>` when plain notation would
    /// need more than [`MAX_PADDING_ZEROS`] filler zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();

        if self.exponent >= 0 {
            if self.exponent as usize > MAX_PADDING_ZEROS {
                return write!(f, "{}{}E+{}", sign, digits, self.exponent);
            }
            let zeros = "0".repeat(self.exponent as usize);
            return write!(f, "{}{}{}", sign, digits, zeros);
        }

        let scale = self.exponent.unsigned_abs() as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        } else if scale - digits.len() > MAX_PADDING_ZEROS {
            write!(f, "{}{}E{}", sign, digits, self.exponent)
        } else {
            let zeros = "0".repeat(scale - digits.len());
            write!(f, "{}0.{}{}", sign, zeros, digits)
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DecimalParseError::Empty);
        }

        let bytes = s.as_bytes();
        let mut pos = 0;
        let negative = match bytes[0] {
            b'-' => {
                pos += 1;
                true
            }
            b'+' => {
                pos += 1;
                false
            }
            _ => false,
        };

        let mut mantissa: i128 = 0;
        let mut exponent: i64 = 0;
        let mut digits = 0usize;
        let mut seen_point = false;
        // Zeros read after the last nonzero digit, not yet in the mantissa.
        let mut pending_zeros: u32 = 0;

        while pos < bytes.len() {
            let c = bytes[pos];
            match c {
                b'0' => {
                    if mantissa != 0 {
                        pending_zeros = pending_zeros.saturating_add(1);
                    }
                    if seen_point {
                        exponent -= 1;
                    }
                    digits += 1;
                }
                b'1'..=b'9' => {
                    mantissa = 10i128
                        .checked_pow(pending_zeros.saturating_add(1))
                        .and_then(|scale| mantissa.checked_mul(scale))
                        .and_then(|m| m.checked_add((c - b'0') as i128))
                        .ok_or(DecimalParseError::Overflow)?;
                    pending_zeros = 0;
                    if seen_point {
                        exponent -= 1;
                    }
                    digits += 1;
                }
                b'.' if !seen_point => seen_point = true,
                b'e' | b'E' if digits > 0 => break,
                _ => {
                    return Err(DecimalParseError::InvalidCharacter {
                        position: pos,
                        found: s[pos..].chars().next().unwrap_or('?'),
                    });
                }
            }
            pos += 1;
        }

        if digits == 0 {
            return Err(invalid_at(s, pos));
        }
        exponent += i64::from(pending_zeros);

        if pos < bytes.len() {
            // Exponent part; `pos` is at the 'e'.
            let exp_str = &s[pos + 1..];
            let exp_digits = exp_str
                .strip_prefix(|c: char| c == '+' || c == '-')
                .unwrap_or(exp_str);
            if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid_at(s, pos));
            }
            let explicit: i64 = exp_str
                .parse()
                .map_err(|_| DecimalParseError::Overflow)?;
            exponent = exponent
                .checked_add(explicit)
                .ok_or(DecimalParseError::Overflow)?;
        }

        let exponent = i32::try_from(exponent).map_err(|_| DecimalParseError::Overflow)?;
        let mantissa = if negative { -mantissa } else { mantissa };
        Ok(Decimal::new(mantissa, exponent))
    }
}

fn invalid_at(s: &str, pos: usize) -> DecimalParseError {
    match s[pos.min(s.len())..].chars().next() {
        Some(found) => DecimalParseError::InvalidCharacter {
            position: pos,
            found,
        },
        None => DecimalParseError::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(dec("2").to_string(), "2");
        assert_eq!(dec("-2").to_string(), "-2");
        assert_eq!(dec("12.340").to_string(), "12.34");
        assert_eq!(dec("0.05").to_string(), "0.05");
        assert_eq!(dec("-0.5").to_string(), "-0.5");
        assert_eq!(dec("1200").to_string(), "1200");
        assert_eq!(dec("000").to_string(), "0");
        assert_eq!(dec("1E+3").to_string(), "1000");
        assert_eq!(dec("15e-1").to_string(), "1.5");
    }

    #[test]
    fn test_insignificant_zeros_do_not_overflow() {
        let long_fraction = format!("1.{}", "0".repeat(40));
        assert_eq!(dec(&long_fraction), Decimal::from(1));
        let padded = format!("{}7.5{}", "0".repeat(50), "0".repeat(50));
        assert_eq!(dec(&padded), dec("7.5"));
        assert_eq!(dec(&format!("0.{}3", "0".repeat(45))), Decimal::new(3, -46));
        assert_eq!(dec(&format!("2{}", "0".repeat(45))), Decimal::new(2, 45));
        assert_eq!(
            format!("1{}1", "0".repeat(40)).parse::<Decimal>(),
            Err(DecimalParseError::Overflow)
        );
    }

    #[test]
    fn test_large_exponents_use_exponent_notation() {
        assert_eq!(dec("1e2000000").to_string(), "1E+2000000");
        assert_eq!(dec("-25e-2000000").to_string(), "-25E-2000000");
        assert_eq!(Decimal::new(1, 32).to_string(), format!("1{}", "0".repeat(32)));
        assert_eq!(Decimal::new(1, 33).to_string(), "1E+33");
        let values = [
            dec("1e2000000"),
            dec("-25e-2000000"),
            Decimal::new(7, i32::MAX),
            Decimal::new(-3, i32::MIN),
        ];
        for value in values {
            assert_eq!(dec(&value.to_string()), value);
        }
    }

    #[test]
    fn test_normalized_equality() {
        assert_eq!(dec("2"), dec("2.0"));
        assert_eq!(dec("2.500"), dec("2.5"));
        assert_eq!(dec("0.0"), Decimal::ZERO);
        assert_eq!(dec("100").mantissa(), 1);
        assert_eq!(dec("100").exponent(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Decimal>(), Err(DecimalParseError::Empty));
        assert_eq!("-".parse::<Decimal>(), Err(DecimalParseError::Empty));
        assert!(matches!(
            "1.2.3".parse::<Decimal>(),
            Err(DecimalParseError::InvalidCharacter { position: 3, found: '.' })
        ));
        assert!("abc".parse::<Decimal>().is_err());
        assert!("1e".parse::<Decimal>().is_err());
        assert!("1e+".parse::<Decimal>().is_err());
        assert_eq!(
            "9".repeat(60).parse::<Decimal>(),
            Err(DecimalParseError::Overflow)
        );
    }

    #[test]
    fn test_add_sub_aligns_exponents() {
        assert_eq!(dec("0.1").checked_add(dec("0.2")), Some(dec("0.3")));
        assert_eq!(dec("2").checked_sub(dec("4")), Some(dec("-2")));
        assert_eq!(dec("100").checked_add(dec("0.01")), Some(dec("100.01")));
        assert_eq!(dec("1.5").checked_sub(dec("1.5")), Some(Decimal::ZERO));
    }

    #[test]
    fn test_overflow_is_none() {
        let big = Decimal::new(i128::MAX, 0);
        assert_eq!(big.checked_add(Decimal::from(1)), None);
        assert_eq!(Decimal::new(i128::MIN, 0).checked_neg(), None);
        // Rescaling 1e30 down to exponent -30 needs 61 digits.
        assert_eq!(dec("1e30").checked_add(dec("1e-30")), None);
    }

    #[test]
    fn test_ordering() {
        assert!(dec("-2") < dec("-1.5"));
        assert!(dec("-1") < Decimal::ZERO);
        assert!(dec("0.001") < dec("0.01"));
        assert!(dec("10") > dec("9.99"));
        assert!(dec("1e30") > dec("123456789"));
        assert_eq!(dec("2.0").cmp(&dec("2")), Ordering::Equal);
    }

    proptest! {
        #[test]
        fn prop_add_then_sub_is_identity(
            a in -1_000_000_000i64..1_000_000_000,
            ae in -6i32..6,
            b in -1_000_000_000i64..1_000_000_000,
            be in -6i32..6,
        ) {
            let a = Decimal::new(a as i128, ae);
            let b = Decimal::new(b as i128, be);
            let sum = a.checked_add(b).unwrap();
            prop_assert_eq!(sum.checked_sub(b).unwrap(), a);
        }

        #[test]
        fn prop_display_parse_roundtrip(m in any::<i64>(), e in -20i32..20) {
            let value = Decimal::new(m as i128, e);
            prop_assert_eq!(value.to_string().parse::<Decimal>().unwrap(), value);
        }
    }
}
