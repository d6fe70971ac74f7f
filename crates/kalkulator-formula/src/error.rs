//! Formula error types
//!
//! Errors come in two tiers. [`PrepareError`] stops a calculator from being
//! built at all; [`EvalError`] happens while an expression runs and is turned
//! into an error [`Outcome`](crate::Outcome) by the calculator.

use crate::messages::MessageKind;
use thiserror::Error;

/// Result type for expression parsing and evaluation
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Errors that prevent a formula from being prepared for evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrepareError {
    /// The declared mode is neither `oneline` nor `conditional`
    #[error("Invalid calculation mode: {0:?}")]
    InvalidMode(String),

    /// Single mode without a textual expression
    #[error("Prepared expression has incorrect type: expected an expression string")]
    MissingExpression,

    /// Conditional mode whose payload is not a list of lines
    #[error("Prepared expression has incorrect type: expected a list of conditions")]
    NotAList,

    /// Referenced variables that have no numeric binding
    #[error("Missing variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

impl PrepareError {
    /// Message table entry used when this error is reported
    pub fn kind(&self) -> MessageKind {
        match self {
            PrepareError::InvalidMode(_) => MessageKind::InvalidMode,
            PrepareError::MissingExpression | PrepareError::NotAList => MessageKind::InvalidShape,
            PrepareError::MissingVariables(_) => MessageKind::MissingVariables,
        }
    }
}

/// Errors that can occur while parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Malformed expression
    #[error("{message} around position {position} for expression `{expression}`.")]
    Syntax {
        message: String,
        position: usize,
        expression: String,
    },

    /// Call to a function outside the whitelist
    #[error("The function \"{name}\" does not exist around position {position}.")]
    UnknownFunction { name: String, position: usize },

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}.")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Reference to a name that is not bound
    #[error("Variable \"{0}\" is not valid.")]
    UnknownVariable(String),

    /// Division or modulo by zero
    #[error("Division by zero.")]
    DivisionByZero,
}

/// Every way a calculation can end without a price
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Parsing or evaluation failed
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// The computed price is negative
    #[error("The price is less than zero. ={0}")]
    NegativePrice(f64),

    /// The computed price is zero
    #[error("The price is equal zero.")]
    ZeroPrice,

    /// The computed price is NaN or infinite
    #[error("The price is not a finite number.")]
    NotFinite(f64),

    /// No conditional branch matched
    #[error("Undefined result!")]
    UndefinedResult,

    /// The calculator was not prepared successfully
    #[error("Invalid data!")]
    InvalidData(Option<PrepareError>),
}

impl CalcError {
    /// Message table entry used when this error is reported
    pub fn kind(&self) -> MessageKind {
        match self {
            CalcError::Eval(EvalError::DivisionByZero) => MessageKind::DivisionByZero,
            CalcError::Eval(_) => MessageKind::SyntaxError,
            CalcError::NegativePrice(_) => MessageKind::NegativePrice,
            CalcError::ZeroPrice => MessageKind::ZeroPrice,
            CalcError::NotFinite(_) => MessageKind::NotFinite,
            CalcError::UndefinedResult => MessageKind::UndefinedResult,
            CalcError::InvalidData(_) => MessageKind::InvalidData,
        }
    }

    /// Text substituted for `{detail}` in the message template
    pub fn detail(&self) -> String {
        match self {
            CalcError::Eval(e) => e.to_string(),
            CalcError::NegativePrice(value) | CalcError::NotFinite(value) => value.to_string(),
            CalcError::InvalidData(Some(e)) => e.to_string(),
            _ => String::new(),
        }
    }
}
