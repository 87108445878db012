//! Format policy attached to values and calculators

use std::fmt;

use crate::rounding::Rounding;

/// Fractional digits kept at presentation time when no scale is set.
pub const MAX_PRESENTATION_SCALE: i64 = 64;

/// Default decimal separator for both input and output.
pub const DEFAULT_DECIMAL_SEPARATOR: char = '.';

/// Formatting and precision policy.
///
/// Every field is tri-state: an unset field falls back along the resolution
/// chain value → calculator → process default. [`Properties::load_from`]
/// copies a whole policy, which is how a calculator stamps its policy onto
/// a final result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties {
    scale: Option<i64>,
    rounding: Option<Rounding>,
    strip_trailing_zeros: Option<bool>,
    input_separator: Option<char>,
    output_separator: Option<char>,
    grouping_separator: Option<char>,
    output_pattern: Option<String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target number of fractional digits, `None` when unset (full precision,
    /// capped at [`MAX_PRESENTATION_SCALE`] for presentation).
    pub fn scale(&self) -> Option<i64> {
        self.scale
    }

    /// A negative scale clears the setting.
    pub fn set_scale(&mut self, scale: i64) -> &mut Self {
        self.scale = if scale < 0 { None } else { Some(scale) };
        self
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding.unwrap_or_default()
    }

    pub fn set_rounding(&mut self, rounding: Rounding) -> &mut Self {
        self.rounding = Some(rounding);
        self
    }

    pub fn strip_trailing_zeros(&self) -> bool {
        self.strip_trailing_zeros.unwrap_or(true)
    }

    pub fn set_strip_trailing_zeros(&mut self, strip: bool) -> &mut Self {
        self.strip_trailing_zeros = Some(strip);
        self
    }

    pub fn input_decimal_separator(&self) -> char {
        self.input_separator.unwrap_or(DEFAULT_DECIMAL_SEPARATOR)
    }

    pub fn set_input_decimal_separator(&mut self, separator: char) -> &mut Self {
        self.input_separator = Some(separator);
        self
    }

    pub fn output_decimal_separator(&self) -> char {
        self.output_separator.unwrap_or(DEFAULT_DECIMAL_SEPARATOR)
    }

    pub fn set_output_decimal_separator(&mut self, separator: char) -> &mut Self {
        self.output_separator = Some(separator);
        self
    }

    /// Sets both the input and output decimal separator.
    pub fn set_decimal_separator(&mut self, separator: char) -> &mut Self {
        self.input_separator = Some(separator);
        self.output_separator = Some(separator);
        self
    }

    /// Thousands separator for rendered output, `None` for no grouping.
    pub fn grouping_separator(&self) -> Option<char> {
        self.grouping_separator
    }

    pub fn set_grouping_separator(&mut self, separator: Option<char>) -> &mut Self {
        self.grouping_separator = separator;
        self
    }

    /// `DecimalFormat`-style output pattern, e.g. `#,##0.00`. Only the
    /// grouping flag and the minimum fraction digits are honored.
    pub fn output_pattern(&self) -> Option<&str> {
        self.output_pattern.as_deref()
    }

    pub fn set_output_pattern(&mut self, pattern: Option<String>) -> &mut Self {
        self.output_pattern = pattern;
        self
    }

    /// Copies every field of `other` into `self`, set or not.
    pub fn load_from(&mut self, other: &Properties) {
        *self = other.clone();
    }

    /// Scale for scale-sensitive arithmetic: the value's own, else the
    /// calculator's, else [`MAX_PRESENTATION_SCALE`].
    pub(crate) fn inherited_scale(value: &Properties, calculator: &Properties) -> i64 {
        value
            .scale
            .or(calculator.scale)
            .unwrap_or(MAX_PRESENTATION_SCALE)
    }

    /// Rounding mode along the same resolution chain.
    pub(crate) fn inherited_rounding(value: &Properties, calculator: &Properties) -> Rounding {
        value
            .rounding
            .or(calculator.rounding)
            .unwrap_or_default()
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scale {
            Some(scale) => write!(f, "scale: {scale}")?,
            None => write!(f, "scale: none")?,
        }
        write!(
            f,
            ", rounding: {}, strip zeros: {}, separators: '{}'/'{}'",
            self.rounding(),
            self.strip_trailing_zeros(),
            self.input_decimal_separator(),
            self.output_decimal_separator(),
        )?;
        if let Some(grouping) = self.grouping_separator {
            write!(f, ", grouping: '{grouping}'")?;
        }
        if let Some(pattern) = &self.output_pattern {
            write!(f, ", pattern: '{pattern}'")?;
        }
        Ok(())
    }
}
