//! # kalkulator-formula
//!
//! Pricing formula evaluator.
//!
//! This crate provides:
//! - Normalization of user-authored formula text
//! - Mode detection and shape validation (`oneline` / `conditional`)
//! - Numeric variable binding with missing-reference checks
//! - A restricted expression parser and evaluator with a math whitelist
//! - A swappable message table for error reporting
//!
//! ## Example
//!
//! ```rust
//! use kalkulator_formula::{Calculator, Outcome, RawFormula, RawLine};
//! use serde_json::json;
//!
//! let formula = RawFormula::conditional(vec![
//!     RawLine::condition("{qty} >= 10", "{qty} * {unit} * 0,9"),
//!     RawLine::otherwise("{qty} * {unit}"),
//! ]);
//! let vars = json!({ "qty": 10, "unit": 2 });
//!
//! let outcome = Calculator::new(&formula, vars.as_object().unwrap()).execute();
//! assert_eq!(outcome, Outcome::Success(18.0));
//! ```

pub mod ast;
pub mod binding;
pub mod calculation;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod messages;
pub mod normalize;
pub mod outcome;
pub mod parser;
pub mod shape;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use binding::{bind, check_references, references, scan_references, VariableSet};
pub use calculation::{check_price, prepare, Calculator, PreparedFormula};
pub use error::{CalcError, EvalError, EvalResult, PrepareError};
pub use evaluator::{evaluate, EvaluationContext, Value};
pub use functions::FunctionRegistry;
pub use messages::{MessageKind, Messages};
pub use normalize::{decode_html_entities, escape_delimiter, normalize, unescape_delimiter};
pub use outcome::Outcome;
pub use parser::parse_expression;
pub use shape::{
    detect_mode, validate_shape, Branch, EvaluationMode, Expression, NormalizedFormula,
    RawFormula, RawLine,
};
