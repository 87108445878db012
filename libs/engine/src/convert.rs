//! Conversion seams between host types and [`Num`]
//!
//! Built-in sources form the closed [`Value`] sum; anything else crosses
//! the [`NumConverter`] bridge, registered per-type in the extension
//! registry.

use std::any::Any;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;

use crate::error::Result;
use crate::num::Num;

/// Built-in construction sources for [`Num`].
#[derive(Debug, Clone)]
pub enum Value {
    Short(i16),
    Int(i32),
    Long(i64),
    UShort(u16),
    UInt(u32),
    ULong(u64),
    Float(f32),
    Double(f64),
    BigInt(BigInt),
    Decimal(BigDecimal),
    Text(String),
    /// A literal with an explicit decimal separator, e.g. `("1,5", ',')`.
    TextWithSeparator(String, char),
}

impl Value {
    pub fn into_num(self) -> Result<Num> {
        match self {
            Value::Short(v) => Ok(Num::from(v)),
            Value::Int(v) => Ok(Num::from(v)),
            Value::Long(v) => Ok(Num::from(v)),
            Value::UShort(v) => Ok(Num::from(v)),
            Value::UInt(v) => Ok(Num::from(v)),
            Value::ULong(v) => Ok(Num::from(v)),
            Value::Float(v) => Num::from_f32(v),
            Value::Double(v) => Num::from_f64(v),
            Value::BigInt(v) => Ok(Num::from(v)),
            Value::Decimal(v) => Ok(Num::from(v)),
            Value::Text(v) => Num::parse(&v),
            Value::TextWithSeparator(v, sep) => Num::parse_with_separator(&v, sep),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        })*
    };
}

value_from!(
    i16 => Short,
    i32 => Int,
    i64 => Long,
    u16 => UShort,
    u32 => UInt,
    u64 => ULong,
    f32 => Float,
    f64 => Double,
    BigInt => BigInt,
    BigDecimal => Decimal,
    String => Text
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl Num {
    /// Builds a value from any built-in source.
    pub fn from_value(value: impl Into<Value>) -> Result<Num> {
        value.into().into_num()
    }

    /// Converts a foreign value through the process-wide converter tier.
    ///
    /// Fails with [`crate::Error::UnsupportedType`] when no converter is
    /// registered for the concrete type.
    pub fn from_foreign(value: &dyn Any) -> Result<Num> {
        crate::registry::global::convert_to_num(value)
    }
}

/// Bridge between a foreign host type and [`Num`].
///
/// A converter is registered for one concrete type; lookups key on the
/// `TypeId` of the value behind the `&dyn Any`.
pub trait NumConverter: Send + Sync {
    /// Name of the foreign type, used in error messages.
    fn type_name(&self) -> &'static str;

    /// Converts a foreign value into a [`Num`].
    fn to_num(&self, value: &dyn Any) -> Result<Num>;

    /// Converts a [`Num`] back into the foreign type.
    fn from_num(&self, value: &Num) -> Result<Box<dyn Any>>;
}
