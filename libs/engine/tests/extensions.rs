//! Custom operators, functions and converters through both registry tiers

use std::any::Any;
use std::sync::Arc;

use decalc_engine::registry::global;
use decalc_engine::{
    Arity, Error, Expression, Function, Num, NumConverter, Operator, Properties, Result,
};

struct Avg;

impl Operator for Avg {
    fn symbol(&self) -> &str {
        "~"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn apply(&self, _calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        let sum = left.raw() + right.raw();
        Ok(Num::from(sum / bigdecimal::BigDecimal::from(2)))
    }
}

struct ShoutingAdd;

impl Operator for ShoutingAdd {
    fn symbol(&self) -> &str {
        "+"
    }

    fn priority(&self) -> u8 {
        5
    }

    fn apply(&self, _calculator: &Properties, left: &Num, right: &Num) -> Result<Num> {
        // multiplies instead of adding so the shadowing is observable
        Ok(Num::from(left.raw() * right.raw()))
    }
}

struct Max;

impl Function for Max {
    fn symbol(&self) -> &str {
        "max"
    }

    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn apply(&self, _calculator: &Properties, args: &[Num]) -> Result<Num> {
        let mut best: Option<Num> = None;
        for arg in args {
            let better = match &best {
                Some(current) => arg.raw() > current.raw(),
                None => true,
            };
            if better {
                best = Some(arg.clone());
            }
        }
        best.ok_or_else(|| Error::Arithmetic("max needs at least one argument".to_string()))
    }
}

#[test]
fn local_operator_extends_the_symbol_set() {
    let mut expr = Expression::new();
    expr.register_operator(Arc::new(Avg));
    expr.append_text("4 ~ 6", &[]).unwrap();
    assert!(expr.evaluate().unwrap().is_equal(&Num::from(5)));
}

#[test]
fn local_operator_shadows_the_global_tier() {
    let mut shadowed = Expression::new();
    shadowed.register_operator(Arc::new(ShoutingAdd));
    shadowed.append_text("2 + 3", &[]).unwrap();
    assert!(shadowed.evaluate().unwrap().is_equal(&Num::from(6)));

    // other expressions keep the built-in addition
    let mut plain = Expression::parse("2 + 3", &[]).unwrap();
    assert!(plain.evaluate().unwrap().is_equal(&Num::from(5)));
}

#[test]
fn local_variadic_function() {
    let mut expr = Expression::new();
    expr.register_function(Arc::new(Max));
    expr.append_text("max(3, 9, 6) + 1", &[]).unwrap();
    assert!(expr.evaluate().unwrap().is_equal(&Num::from(10)));
}

#[test]
fn custom_operator_priority_is_honored() {
    let mut expr = Expression::new();
    expr.register_operator(Arc::new(Avg));
    // ~ binds like * so it wins over +
    expr.append_text("1 + 4 ~ 6", &[]).unwrap();
    assert!(expr.evaluate().unwrap().is_equal(&Num::from(6)));
}

struct Doubled;

impl Function for Doubled {
    fn symbol(&self) -> &str {
        "doubled"
    }

    fn arity(&self) -> Arity {
        Arity::Fixed(1)
    }

    fn apply(&self, _calculator: &Properties, args: &[Num]) -> Result<Num> {
        match args {
            [arg] => Ok(Num::from(arg.raw() * bigdecimal::BigDecimal::from(2))),
            _ => Err(Error::Arithmetic("doubled takes 1 argument".to_string())),
        }
    }
}

#[test]
fn global_registration_is_visible_to_new_expressions() {
    global::register_function(Arc::new(Doubled));

    let mut expr = Expression::parse("doubled(21)", &[]).unwrap();
    assert!(expr.evaluate().unwrap().is_equal(&Num::from(42)));
}

struct Fahrenheit(f64);

struct FahrenheitConverter;

impl NumConverter for FahrenheitConverter {
    fn type_name(&self) -> &'static str {
        "Fahrenheit"
    }

    fn to_num(&self, value: &dyn Any) -> Result<Num> {
        let f = value
            .downcast_ref::<Fahrenheit>()
            .ok_or_else(|| Error::UnsupportedType("Fahrenheit".to_string()))?;
        Num::from_f64((f.0 - 32.0) * 5.0 / 9.0)
    }

    fn from_num(&self, value: &Num) -> Result<Box<dyn Any>> {
        let celsius = value
            .to_f64()
            .ok_or_else(|| Error::Arithmetic("out of f64 range".to_string()))?;
        Ok(Box::new(Fahrenheit(celsius * 9.0 / 5.0 + 32.0)))
    }
}

#[test]
fn local_converter_bridges_foreign_values() {
    let mut expr = Expression::new();
    expr.register_converter::<Fahrenheit>(Arc::new(FahrenheitConverter));

    let celsius = expr.convert(&Fahrenheit(212.0)).unwrap();
    assert!(celsius.is_equal(&Num::from(100)));

    // unregistered types are rejected
    let err = expr.convert(&"just a str").unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)));
}
