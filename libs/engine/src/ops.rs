//! Operator and function extension points, plus the built-in set
//!
//! Built-ins cover the arithmetic operators `+ - * / % ^` and the unary
//! functions `abs sqrt log sin cos tan sinh cosh tanh`. Custom
//! implementations plug into the same traits through the registry.

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use crate::error::{Error, Result};
use crate::num::{apply_scale, Num};
use crate::properties::Properties;

/// How many arguments a function takes. The evaluator does not enforce
/// this; implementations check their own argument slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

/// A binary infix operator.
///
/// `calculator` is the owning expression's policy, consulted for inherited
/// scale and rounding by scale-sensitive operators.
pub trait Operator: Send + Sync {
    fn symbol(&self) -> &str;
    fn priority(&self) -> u8;
    fn apply(&self, calculator: &Properties, left: &Num, right: &Num) -> Result<Num>;
}

/// A named function over evaluated arguments.
pub trait Function: Send + Sync {
    fn symbol(&self) -> &str;
    fn arity(&self) -> Arity;
    fn apply(&self, calculator: &Properties, args: &[Num]) -> Result<Num>;
}

fn single<'a>(symbol: &str, args: &'a [Num]) -> Result<&'a Num> {
    match args {
        [arg] => Ok(arg),
        _ => Err(Error::Arithmetic(format!(
            "{symbol} takes 1 argument, got {}",
            args.len()
        ))),
    }
}

fn as_f64(value: &Num) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| Error::Arithmetic(format!("{value} is not representable as f64")))
}

pub struct Add;

impl Operator for Add {
    fn symbol(&self) -> &str {
        "+"
    }

    fn priority(&self) -> u8 {
        5
    }

    fn apply(&self, _calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        Ok(Num::from(left.raw() + right.raw()))
    }
}

pub struct Sub;

impl Operator for Sub {
    fn symbol(&self) -> &str {
        "-"
    }

    fn priority(&self) -> u8 {
        5
    }

    fn apply(&self, _calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        Ok(Num::from(left.raw() - right.raw()))
    }
}

pub struct Mul;

impl Operator for Mul {
    fn symbol(&self) -> &str {
        "*"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn apply(&self, _calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        Ok(Num::from(left.raw() * right.raw()))
    }
}

pub struct Div;

impl Operator for Div {
    fn symbol(&self) -> &str {
        "/"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn apply(&self, calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        if right.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let scale = Properties::inherited_scale(right.properties(), calculator);
        let rounding = Properties::inherited_rounding(right.properties(), calculator);
        let quotient = left.raw() / right.raw();
        Ok(Num::from(apply_scale(&quotient, scale, rounding)?))
    }
}

pub struct Mod;

impl Operator for Mod {
    fn symbol(&self) -> &str {
        "%"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn apply(&self, _calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        if right.is_zero() {
            return Err(Error::DivisionByZero);
        }
        // Truncating remainder: l - trunc(l / r) * r
        let quotient = (left.raw() / right.raw())
            .with_scale_round(0, bigdecimal::RoundingMode::Down);
        Ok(Num::from(left.raw() - &(&quotient * right.raw())))
    }
}

pub struct Pow;

impl Pow {
    fn int_pow(base: &BigDecimal, exponent: u64) -> BigDecimal {
        // Exponentiation by squaring
        let mut result = BigDecimal::one();
        let mut factor = base.clone();
        let mut e = exponent;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &factor;
            }
            e >>= 1;
            if e > 0 {
                factor = &factor * &factor;
            }
        }
        result
    }
}

impl Operator for Pow {
    fn symbol(&self) -> &str {
        "^"
    }

    fn priority(&self) -> u8 {
        15
    }

    fn apply(&self, calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        if right.has_fraction() {
            let base = as_f64(left)?;
            let exponent = as_f64(right)?;
            return Num::from_f64(base.powf(exponent));
        }

        let exponent = right
            .to_i64()
            .ok_or_else(|| Error::Arithmetic(format!("exponent {right} out of range")))?;
        if exponent == 0 {
            return Ok(Num::from(1));
        }
        if exponent > 0 {
            return Ok(Num::from(Self::int_pow(left.raw(), exponent as u64)));
        }

        // Negative exponent: 1 / base^|e| at the inherited scale
        let positive = Self::int_pow(left.raw(), exponent.unsigned_abs());
        if positive.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let scale = Properties::inherited_scale(right.properties(), calculator);
        let rounding = Properties::inherited_rounding(right.properties(), calculator);
        let inverse = BigDecimal::one() / &positive;
        Ok(Num::from(apply_scale(&inverse, scale, rounding)?))
    }
}

pub struct Abs;

impl Function for Abs {
    fn symbol(&self) -> &str {
        "abs"
    }

    fn arity(&self) -> Arity {
        Arity::Fixed(1)
    }

    fn apply(&self, _calculator: &Properties, args: &[Num]) -> Result<Num> {
        Ok(single(self.symbol(), args)?.abs())
    }
}

pub struct Sqrt;

impl Function for Sqrt {
    fn symbol(&self) -> &str {
        "sqrt"
    }

    fn arity(&self) -> Arity {
        Arity::Fixed(1)
    }

    fn apply(&self, _calculator: &Properties, args: &[Num]) -> Result<Num> {
        let arg = single(self.symbol(), args)?;
        let root = arg
            .raw()
            .sqrt()
            .ok_or_else(|| Error::Arithmetic(format!("square root of negative number {arg}")))?;
        Ok(Num::from(root))
    }
}

pub struct Log;

impl Function for Log {
    fn symbol(&self) -> &str {
        "log"
    }

    fn arity(&self) -> Arity {
        Arity::Fixed(1)
    }

    fn apply(&self, _calculator: &Properties, args: &[Num]) -> Result<Num> {
        let arg = single(self.symbol(), args)?;
        let value = as_f64(arg)?;
        if value <= 0.0 {
            return Err(Error::Arithmetic(format!("logarithm of {arg}")));
        }
        Num::from_f64(value.ln())
    }
}

macro_rules! f64_function {
    ($name:ident, $symbol:literal, $method:ident) => {
        pub struct $name;

        impl Function for $name {
            fn symbol(&self) -> &str {
                $symbol
            }

            fn arity(&self) -> Arity {
                Arity::Fixed(1)
            }

            fn apply(&self, _calculator: &Properties, args: &[Num]) -> Result<Num> {
                let value = as_f64(single(self.symbol(), args)?)?;
                Num::from_f64(value.$method())
            }
        }
    };
}

f64_function!(Sin, "sin", sin);
f64_function!(Cos, "cos", cos);
f64_function!(Tan, "tan", tan);
f64_function!(Sinh, "sinh", sinh);
f64_function!(Cosh, "cosh", cosh);
f64_function!(Tanh, "tanh", tanh);

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> Properties {
        Properties::default()
    }

    #[test]
    fn add_is_exact() {
        let out = Add
            .apply(&props(), &Num::parse("0.1").unwrap(), &Num::parse("0.2").unwrap())
            .unwrap();
        assert!(out.is_equal(&Num::parse("0.3").unwrap()));
    }

    #[test]
    fn div_applies_inherited_scale() {
        let mut calc = props();
        calc.set_scale(2);
        let out = Div.apply(&calc, &Num::from(1), &Num::from(3)).unwrap();
        assert_eq!(out.raw().to_string(), "0.33");
    }

    #[test]
    fn div_by_zero() {
        assert_eq!(
            Div.apply(&props(), &Num::from(1), &Num::from(0)),
            Err(Error::DivisionByZero)
        );
    }

    #[test]
    fn modulo_truncates() {
        let out = Mod.apply(&props(), &Num::from(2), &Num::from(5)).unwrap();
        assert!(out.is_equal(&Num::from(2)));
        let out = Mod.apply(&props(), &Num::from(7), &Num::from(3)).unwrap();
        assert!(out.is_equal(&Num::from(1)));
    }

    #[test]
    fn pow_integer_exponents() {
        let out = Pow.apply(&props(), &Num::from(2), &Num::from(10)).unwrap();
        assert!(out.is_equal(&Num::from(1024)));

        let out = Pow.apply(&props(), &Num::from(5), &Num::from(0)).unwrap();
        assert!(out.is_equal(&Num::from(1)));

        let out = Pow.apply(&props(), &Num::from(2), &Num::from(-2)).unwrap();
        assert!(out.is_equal(&Num::parse("0.25").unwrap()));
    }

    #[test]
    fn pow_fractional_exponent() {
        let out = Pow
            .apply(&props(), &Num::from(9), &Num::parse("0.5").unwrap())
            .unwrap();
        assert!(out.is_equal(&Num::from(3)));
    }

    #[test]
    fn sqrt_rejects_negative() {
        let out = Sqrt.apply(&props(), &[Num::from(-4)]);
        assert!(matches!(out, Err(Error::Arithmetic(_))));
        let out = Sqrt.apply(&props(), &[Num::from(16)]).unwrap();
        assert!(out.is_equal(&Num::from(4)));
    }
}
