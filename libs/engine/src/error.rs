//! Error types for the expression engine

use std::fmt;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of a binary operator an operand was expected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSide {
    Left,
    Right,
}

impl fmt::Display for OperandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandSide::Left => write!(f, "left"),
            OperandSide::Right => write!(f, "right"),
        }
    }
}

/// Parse and evaluation errors.
///
/// Parse-side variants (`NumberFormat`, `UndefinedVariables`, `UnknownSymbol`,
/// `UnknownFunction`) mean the input text was bad; evaluation-side variants
/// mean a structurally valid expression failed to compute.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Cannot parse number from '{literal}': {reason}")]
    NumberFormat { literal: String, reason: String },

    #[error("Missing values for variables [{}] in '{expression}'", .names.join(", "))]
    UndefinedVariables {
        expression: String,
        names: Vec<String>,
    },

    #[error("Unknown symbol '{symbol}' in '{expression}'")]
    UnknownSymbol { symbol: String, expression: String },

    #[error("Unknown function '{name}' in '{expression}'")]
    UnknownFunction { name: String, expression: String },

    #[error("Too many open brackets in '{0}'")]
    UnbalancedOpen(String),

    #[error("Too many close brackets in '{0}'")]
    UnbalancedClose(String),

    #[error("Missing {side} operand for operator '{operator}'")]
    MissingOperand { operator: String, side: OperandSide },

    #[error("Operator '{operator}' failed in '{expression}': {reason}")]
    OperatorFailed {
        operator: String,
        expression: String,
        reason: String,
        trace: Option<String>,
    },

    #[error("Function '{function}' failed in '{expression}': {reason}")]
    FunctionFailed {
        function: String,
        expression: String,
        reason: String,
        trace: Option<String>,
    },

    #[error("No converter registered for type: {0}")]
    UnsupportedType(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("{0}")]
    Arithmetic(String),

    #[error("Rounding of {value} to scale {scale} would lose digits but rounding mode is UNNECESSARY")]
    InexactRounding { value: String, scale: i64 },

    #[error("Unknown rounding mode: {0}")]
    UnknownRounding(String),
}

impl Error {
    /// Evaluation trail captured by the diagnostic re-run, when one exists.
    pub fn trace(&self) -> Option<&str> {
        match self {
            Error::OperatorFailed { trace, .. } | Error::FunctionFailed { trace, .. } => {
                trace.as_deref()
            }
            _ => None,
        }
    }
}
