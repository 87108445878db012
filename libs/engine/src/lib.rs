//! decalc - arbitrary-precision expression calculator engine
//!
//! Parses infix arithmetic over arbitrary-precision decimals, converts it
//! to postfix and evaluates it with a stack machine:
//!
//! ```text
//! Expression String + Values
//!      |
//!   Parser -> Infix TokenList (variables substituted, functions resolved)
//!      |
//! Shunting-Yard -> Postfix TokenList (cached until the infix list changes)
//!      |
//! Stack Evaluation -> Num (carrying the expression's format policy)
//! ```
//!
//! Operators, functions and foreign-type converters are extension points:
//! an expression's local registry shadows the process-wide tier that holds
//! the built-in set.
//!
//! # Example
//!
//! ```
//! use decalc_engine::{Expression, Num};
//!
//! let mut expr = Expression::parse("(a + b) / 2", &[
//!     Num::from(3).named("a"),
//!     Num::from(4),
//! ]).unwrap();
//! let result = expr.evaluate().unwrap();
//! assert!(result.is_equal(&Num::parse("3.5").unwrap()));
//! ```

pub mod convert;
mod engine;
pub mod error;
pub mod expression;
pub mod num;
pub mod ops;
pub mod parser;
pub mod postfix;
pub mod properties;
pub mod registry;
pub mod rounding;
pub mod token;

// Re-export main types
pub use convert::{NumConverter, Value};
pub use error::{Error, OperandSide, Result};
pub use expression::Expression;
pub use num::Num;
pub use ops::{Arity, Function, Operator};
pub use properties::Properties;
pub use registry::Registry;
pub use rounding::Rounding;
pub use token::{Argument, Bracket, FunctionCall, Token, TokenList};
