//! Arbitrary-precision decimal value type
//!
//! A [`Num`] is an immutable magnitude plus the format policy that governs
//! how it is presented: target scale, rounding mode, separators and
//! trailing-zero stripping. The magnitude itself is never rounded on
//! construction; policy is applied at presentation time.

use std::fmt;
use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::properties::{Properties, MAX_PRESENTATION_SCALE};
use crate::rounding::Rounding;

/// Maximal numeric runs left over after stripping non-numeric characters.
static NUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?|-?\.\d+").unwrap());

/// Number of fractional digits carried by a decimal (negative when the
/// coefficient has trailing integer zeros factored out).
pub(crate) fn scale_of(value: &BigDecimal) -> i64 {
    value.as_bigint_and_exponent().1
}

/// Reduces `value` to `scale` fractional digits under `rounding`.
///
/// `Rounding::Unnecessary` fails unless the reduction is exact.
pub(crate) fn apply_scale(value: &BigDecimal, scale: i64, rounding: Rounding) -> Result<BigDecimal> {
    match rounding.to_mode() {
        Some(mode) => Ok(value.with_scale_round(scale, mode)),
        None => {
            let scaled = value.with_scale_round(scale, RoundingMode::HalfUp);
            if &scaled == value {
                Ok(scaled)
            } else {
                Err(Error::InexactRounding {
                    value: value.to_string(),
                    scale,
                })
            }
        }
    }
}

/// An immutable decimal value with an optional substitution name and its
/// own [`Properties`].
#[derive(Debug, Clone)]
pub struct Num {
    value: BigDecimal,
    name: Option<String>,
    properties: Properties,
}

impl Num {
    fn from_decimal(value: BigDecimal) -> Self {
        Num {
            value,
            name: None,
            properties: Properties::default(),
        }
    }

    pub fn zero() -> Self {
        Num::from_decimal(BigDecimal::zero())
    }

    /// Parses a string literal with the default `'.'` decimal separator.
    ///
    /// The literal's fraction length becomes the value's scale, and a
    /// fractional literal ending in `'0'` keeps its trailing zeros at
    /// presentation time (`"2.50"` stays `2.50`).
    pub fn parse(literal: &str) -> Result<Self> {
        Self::parse_with_separator(literal, crate::properties::DEFAULT_DECIMAL_SEPARATOR)
    }

    /// Parses a string literal whose decimal separator is `separator`.
    ///
    /// Everything except digits, sign and the separator is stripped first,
    /// so grouping characters and surrounding noise (`"USD 1 255 844,55"`)
    /// are tolerated. If the stripped text still does not parse, the single
    /// maximal numeric run is used; more than one run is an error.
    pub fn parse_with_separator(literal: &str, separator: char) -> Result<Self> {
        let mut cleaned = String::with_capacity(literal.len());
        for c in literal.chars() {
            if c.is_ascii_digit() || c == '-' || c == '+' {
                cleaned.push(c);
            } else if c == separator {
                cleaned.push('.');
            }
        }

        let value = match BigDecimal::from_str(&cleaned) {
            Ok(value) => value,
            Err(err) => {
                let runs: Vec<&str> = NUMERIC_RUN
                    .find_iter(&cleaned)
                    .map(|m| m.as_str())
                    .collect();
                match runs.as_slice() {
                    [run] => BigDecimal::from_str(run).map_err(|e| Error::NumberFormat {
                        literal: literal.to_string(),
                        reason: e.to_string(),
                    })?,
                    [] => {
                        return Err(Error::NumberFormat {
                            literal: literal.to_string(),
                            reason: err.to_string(),
                        })
                    }
                    _ => {
                        return Err(Error::NumberFormat {
                            literal: literal.to_string(),
                            reason: format!("ambiguous input, {} numeric runs", runs.len()),
                        })
                    }
                }
            }
        };

        let mut num = Num::from_decimal(value);
        let scale = scale_of(&num.value);
        if scale > 0 {
            num.properties.set_scale(scale);
            if cleaned.contains('.') && cleaned.ends_with('0') {
                num.properties.set_strip_trailing_zeros(false);
            }
        }
        Ok(num)
    }

    /// Builds a value from a finite float, preserving its shortest decimal
    /// representation.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::NumberFormat {
                literal: value.to_string(),
                reason: "not a finite number".to_string(),
            });
        }
        Self::parse(&value.to_string())
    }

    pub fn from_f32(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::NumberFormat {
                literal: value.to_string(),
                reason: "not a finite number".to_string(),
            });
        }
        Self::parse(&value.to_string())
    }

    /// Attaches a substitution name, consumed at parse time when the value
    /// is handed to `Expression::parse`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Returns a copy carrying `properties`.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_scale(mut self, scale: i64) -> Self {
        self.properties.set_scale(scale);
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.properties.set_rounding(rounding);
        self
    }

    pub(crate) fn set_properties(&mut self, properties: &Properties) {
        self.properties.load_from(properties);
    }

    /// The raw magnitude, untouched by the format policy.
    pub fn raw(&self) -> &BigDecimal {
        &self.value
    }

    /// The magnitude with this value's own policy applied.
    pub fn to_decimal(&self) -> Result<BigDecimal> {
        self.to_decimal_with(
            self.properties.scale(),
            self.properties.rounding(),
            self.properties.strip_trailing_zeros(),
        )
    }

    /// The magnitude under an explicit policy: scale + rounding when a scale
    /// is given (otherwise fractional digits are capped at
    /// [`MAX_PRESENTATION_SCALE`]), then trailing-zero stripping.
    pub fn to_decimal_with(
        &self,
        scale: Option<i64>,
        rounding: Rounding,
        strip: bool,
    ) -> Result<BigDecimal> {
        let mut out = match scale {
            Some(scale) => apply_scale(&self.value, scale, rounding)?,
            None if scale_of(&self.value) > MAX_PRESENTATION_SCALE => {
                apply_scale(&self.value, MAX_PRESENTATION_SCALE, rounding)?
            }
            None => self.value.clone(),
        };
        if strip && scale_of(&out) > 0 {
            out = out.normalized();
            if scale_of(&out) < 0 {
                out = out.with_scale(0);
            }
        }
        Ok(out)
    }

    /// Scale-insensitive numeric equality: `2` equals `2.00`.
    pub fn is_equal(&self, other: &Num) -> bool {
        self.presented() == other.presented()
    }

    /// Numeric equality after reducing both raw magnitudes to `scale`.
    pub fn is_equal_scaled(&self, other: &Num, scale: i64, rounding: Rounding) -> Result<bool> {
        let a = apply_scale(&self.value, scale, rounding)?;
        let b = apply_scale(&other.value, scale, rounding)?;
        Ok(a == b)
    }

    /// Numeric equality at the smaller of the two fraction lengths.
    pub fn is_equal_autoscaled(&self, other: &Num, rounding: Rounding) -> Result<bool> {
        let scale = scale_of(&self.value).min(scale_of(&other.value)).max(0);
        self.is_equal_scaled(other, scale, rounding)
    }

    fn presented(&self) -> BigDecimal {
        self.to_decimal().unwrap_or_else(|_| self.value.clone())
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    /// Whether the raw magnitude carries any fractional digits.
    pub fn has_fraction(&self) -> bool {
        scale_of(&self.value) > 0 && self.value.with_scale(0) != self.value
    }

    /// Sign-flipped copy keeping the format policy, used when a leading
    /// minus is folded into a literal.
    pub(crate) fn negated(&self) -> Num {
        Num {
            value: -&self.value,
            name: None,
            properties: self.properties.clone(),
        }
    }

    pub fn abs(&self) -> Num {
        Num {
            value: self.value.abs(),
            name: None,
            properties: self.properties.clone(),
        }
    }

    /// Smallest integer greater than or equal to this value.
    pub fn ceil(&self) -> Num {
        Num {
            value: self.value.with_scale_round(0, RoundingMode::Ceiling),
            name: None,
            properties: self.properties.clone(),
        }
    }

    /// Largest integer less than or equal to this value.
    pub fn floor(&self) -> Num {
        Num {
            value: self.value.with_scale_round(0, RoundingMode::Floor),
            name: None,
            properties: self.properties.clone(),
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.value.to_f64()
    }

    /// Integer part of the magnitude, truncated toward zero.
    pub fn to_i64(&self) -> Option<i64> {
        self.value.with_scale_round(0, RoundingMode::Down).to_i64()
    }
}

/// Exact equality: presented magnitude *and* scale must match, so
/// `Num::parse("2")` and `Num::parse("2.00")` are not `==` even though
/// they are [`Num::is_equal`].
impl PartialEq for Num {
    fn eq(&self, other: &Self) -> bool {
        self.presented().as_bigint_and_exponent() == other.presented().as_bigint_and_exponent()
    }
}

impl From<BigDecimal> for Num {
    fn from(value: BigDecimal) -> Self {
        Num::from_decimal(value)
    }
}

impl From<BigInt> for Num {
    fn from(value: BigInt) -> Self {
        Num::from_decimal(BigDecimal::from(value))
    }
}

macro_rules! num_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Num {
            fn from(value: $t) -> Self {
                Num::from_decimal(BigDecimal::from(value))
            }
        })*
    };
}

num_from_int!(i16, i32, i64, u16, u32, u64);

impl FromStr for Num {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Num::parse(s)
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Num {
    /// Renders the presented value with separators, grouping and the output
    /// pattern applied.
    fn render(&self) -> String {
        let presented = self.presented();
        let props = &self.properties;

        let mut grouping = props.grouping_separator();
        let mut min_fraction = 0usize;
        if let Some(pattern) = props.output_pattern() {
            if pattern.contains(',') && grouping.is_none() {
                grouping = Some(',');
            }
            if let Some(dot) = pattern.rfind('.') {
                min_fraction = pattern[dot + 1..].chars().filter(|c| *c == '0').count();
            }
        }

        let plain = presented.to_string();
        let (sign, unsigned) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain.as_str()),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f.to_string()),
            None => (unsigned, String::new()),
        };

        let mut frac = frac_part;
        while frac.len() < min_fraction {
            frac.push('0');
        }

        let int_digits: Vec<char> = int_part.chars().collect();
        let mut int_out = String::with_capacity(int_digits.len() + int_digits.len() / 3);
        for (i, c) in int_digits.iter().enumerate() {
            if i > 0 {
                if let Some(g) = grouping {
                    if (int_digits.len() - i) % 3 == 0 {
                        int_out.push(g);
                    }
                }
            }
            int_out.push(*c);
        }

        let mut out = String::new();
        out.push_str(sign);
        out.push_str(&int_out);
        if !frac.is_empty() {
            out.push(props.output_decimal_separator());
            out.push_str(&frac);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sets_scale_from_literal() {
        let n = Num::parse("10.5").unwrap();
        assert_eq!(n.properties().scale(), Some(1));
        assert_eq!(n.to_string(), "10.5");

        let n = Num::parse("42").unwrap();
        assert_eq!(n.properties().scale(), None);
        assert_eq!(n.to_string(), "42");
    }

    #[test]
    fn trailing_zero_literal_keeps_zeros() {
        let n = Num::parse("2.50").unwrap();
        assert!(!n.properties().strip_trailing_zeros());
        assert_eq!(n.to_string(), "2.50");

        let n = Num::parse("2.5").unwrap();
        assert_eq!(n.to_string(), "2.5");
    }

    #[test]
    fn parse_strips_noise() {
        let n = Num::parse("USD 1 255 844,551.06").unwrap();
        assert_eq!(n.to_string(), "1255844551.06");
    }

    #[test]
    fn parse_with_comma_separator() {
        let n = Num::parse_with_separator("1.255,06", ',').unwrap();
        assert_eq!(n.to_string(), "1255.06");
    }

    #[test]
    fn parse_rejects_ambiguous_runs() {
        assert!(matches!(
            Num::parse("12..34..56"),
            Err(Error::NumberFormat { .. })
        ));
        assert!(matches!(Num::parse("abc"), Err(Error::NumberFormat { .. })));
    }

    #[test]
    fn exact_vs_numeric_equality() {
        let two = Num::parse("2").unwrap();
        let two_hundredths = Num::parse("2.00").unwrap();
        assert!(two.is_equal(&two_hundredths));
        assert_ne!(two, two_hundredths);
    }

    #[test]
    fn autoscaled_equality() {
        let a = Num::parse("1.2345").unwrap();
        let b = Num::parse("1.23").unwrap();
        assert!(a.is_equal_autoscaled(&b, Rounding::HalfUp).unwrap());
        assert!(!a.is_equal(&b));
    }

    #[test]
    fn unnecessary_rounding_errors_on_inexact() {
        let n = Num::parse("1.25").unwrap().with_rounding(Rounding::Unnecessary);
        let out = n.to_decimal_with(Some(1), Rounding::Unnecessary, true);
        assert!(matches!(out, Err(Error::InexactRounding { .. })));

        let exact = n.to_decimal_with(Some(3), Rounding::Unnecessary, false).unwrap();
        assert_eq!(exact.to_string(), "1.250");
    }

    #[test]
    fn ceil_and_floor() {
        let n = Num::parse("2.3").unwrap();
        assert_eq!(n.ceil().to_string(), "3");
        assert_eq!(n.floor().to_string(), "2");

        let n = Num::parse("-2.3").unwrap();
        assert_eq!(n.ceil().to_string(), "-2");
        assert_eq!(n.floor().to_string(), "-3");
    }

    #[test]
    fn grouping_and_pattern_output() {
        let mut p = Properties::default();
        p.set_grouping_separator(Some(','));
        let n = Num::parse("1234567.5").unwrap().with_properties(p);
        assert_eq!(n.to_string(), "1,234,567.5");

        let mut p = Properties::default();
        p.set_output_pattern(Some("#,##0.00".to_string()));
        let n = Num::parse("1234567.5").unwrap().with_properties(p);
        assert_eq!(n.to_string(), "1,234,567.50");
    }

    #[test]
    fn output_separator() {
        let mut p = Properties::default();
        p.set_output_decimal_separator(',');
        let n = Num::parse("3.14").unwrap().with_properties(p);
        assert_eq!(n.to_string(), "3,14");
    }

    #[test]
    fn scale_cap_when_unset() {
        let one = Num::from(1);
        let three = Num::from(3);
        let n = Num::from(one.raw() / three.raw());
        let presented = n.to_decimal().unwrap();
        assert!(scale_of(&presented) <= MAX_PRESENTATION_SCALE);
    }

    #[test]
    fn named_values() {
        let n = Num::from(5).named("x");
        assert_eq!(n.name(), Some("x"));
        assert_eq!(Num::from(5).name(), None);
    }
}
