//! Rounding modes for scale adjustment

use std::fmt;

use bigdecimal::RoundingMode;

use crate::error::{Error, Result};

/// How a value is rounded when it is reduced to a target scale.
///
/// `Unnecessary` asserts that the reduction is exact and fails with
/// [`Error::InexactRounding`] otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    Up,
    Down,
    Ceiling,
    Floor,
    #[default]
    HalfUp,
    HalfDown,
    HalfEven,
    Unnecessary,
}

impl Rounding {
    /// The equivalent `bigdecimal` mode, or `None` for `Unnecessary` which
    /// has no direct counterpart and is checked explicitly.
    pub(crate) fn to_mode(self) -> Option<RoundingMode> {
        match self {
            Rounding::Up => Some(RoundingMode::Up),
            Rounding::Down => Some(RoundingMode::Down),
            Rounding::Ceiling => Some(RoundingMode::Ceiling),
            Rounding::Floor => Some(RoundingMode::Floor),
            Rounding::HalfUp => Some(RoundingMode::HalfUp),
            Rounding::HalfDown => Some(RoundingMode::HalfDown),
            Rounding::HalfEven => Some(RoundingMode::HalfEven),
            Rounding::Unnecessary => None,
        }
    }

    /// Look up a mode by its canonical name, case-insensitively.
    pub fn by_name(name: &str) -> Result<Rounding> {
        match name.to_ascii_uppercase().as_str() {
            "UP" => Ok(Rounding::Up),
            "DOWN" => Ok(Rounding::Down),
            "CEILING" => Ok(Rounding::Ceiling),
            "FLOOR" => Ok(Rounding::Floor),
            "HALF_UP" => Ok(Rounding::HalfUp),
            "HALF_DOWN" => Ok(Rounding::HalfDown),
            "HALF_EVEN" => Ok(Rounding::HalfEven),
            "UNNECESSARY" => Ok(Rounding::Unnecessary),
            _ => Err(Error::UnknownRounding(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rounding::Up => "UP",
            Rounding::Down => "DOWN",
            Rounding::Ceiling => "CEILING",
            Rounding::Floor => "FLOOR",
            Rounding::HalfUp => "HALF_UP",
            Rounding::HalfDown => "HALF_DOWN",
            Rounding::HalfEven => "HALF_EVEN",
            Rounding::Unnecessary => "UNNECESSARY",
        }
    }
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_name_is_case_insensitive() {
        assert_eq!(Rounding::by_name("half_up").unwrap(), Rounding::HalfUp);
        assert_eq!(Rounding::by_name("CEILING").unwrap(), Rounding::Ceiling);
        assert_eq!(
            Rounding::by_name("Unnecessary").unwrap(),
            Rounding::Unnecessary
        );
    }

    #[test]
    fn by_name_rejects_unknown() {
        assert!(matches!(
            Rounding::by_name("nearest"),
            Err(Error::UnknownRounding(_))
        ));
    }

    #[test]
    fn default_is_half_up() {
        assert_eq!(Rounding::default(), Rounding::HalfUp);
    }
}
