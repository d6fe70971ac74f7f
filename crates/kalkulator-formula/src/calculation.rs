//! Formula calculation
//!
//! A [`Calculator`] runs the full pipeline for one request: mode detection,
//! shape validation, normalization and variable binding happen at
//! construction; parsing and evaluation happen in [`Calculator::execute`].
//!
//! # Example
//!
//! ```rust
//! use kalkulator_formula::{Calculator, Outcome, RawFormula};
//! use serde_json::json;
//!
//! let formula = RawFormula::oneline("{width} * {height} * 0,5");
//! let vars = json!({ "width": 4, "height": 3 });
//! let calculator = Calculator::new(&formula, vars.as_object().unwrap());
//!
//! assert!(calculator.is_ready());
//! assert_eq!(calculator.execute(), Outcome::Success(6.0));
//! ```

use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::binding::{bind, references, VariableSet};
use crate::error::{CalcError, PrepareError};
use crate::evaluator::{evaluate, EvaluationContext, Value};
use crate::functions::FunctionRegistry;
use crate::messages::Messages;
use crate::outcome::Outcome;
use crate::parser::parse_expression;
use crate::shape::{
    detect_mode, validate_shape, EvaluationMode, Expression, NormalizedFormula, RawFormula,
};

/// A formula that passed shape validation and variable binding
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFormula {
    /// Normalized formula
    pub formula: NormalizedFormula,
    /// Numeric bindings
    pub vars: VariableSet,
}

/// Validate, normalize and bind a raw formula
pub fn prepare(
    raw: &RawFormula,
    supplied: &Map<String, JsonValue>,
) -> Result<PreparedFormula, PrepareError> {
    let mode = detect_mode(raw);
    tracing::debug!(mode = ?mode, declared = %raw.mode, "detected evaluation mode");

    let formula = validate_shape(raw, mode)?;
    let vars = bind(&formula, supplied)?;
    Ok(PreparedFormula { formula, vars })
}

/// Evaluates one pricing formula against one set of variables
pub struct Calculator {
    mode: EvaluationMode,
    prepared: Result<PreparedFormula, PrepareError>,
    registry: FunctionRegistry,
    messages: Arc<Messages>,
}

impl Calculator {
    /// Prepare a calculator; failures are kept and reported by [`execute`](Self::execute)
    pub fn new(raw: &RawFormula, supplied: &Map<String, JsonValue>) -> Self {
        let prepared = prepare(raw, supplied);
        if let Err(e) = &prepared {
            tracing::debug!(error = %e, "formula preparation failed");
        }

        Self {
            mode: detect_mode(raw),
            prepared,
            registry: FunctionRegistry::new(),
            messages: Messages::shared_default(),
        }
    }

    /// Use another message table
    pub fn with_messages(mut self, messages: Arc<Messages>) -> Self {
        self.messages = messages;
        self
    }

    /// Whether preparation succeeded
    pub fn is_ready(&self) -> bool {
        self.prepared.is_ok()
    }

    /// Why preparation failed, if it did
    pub fn prepare_error(&self) -> Option<&PrepareError> {
        self.prepared.as_ref().err()
    }

    /// Declared evaluation mode
    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Prepared formula, when ready
    pub fn prepared(&self) -> Option<&PreparedFormula> {
        self.prepared.as_ref().ok()
    }

    /// Variables the formula references (escaped form); empty when not ready
    pub fn references(&self) -> BTreeSet<String> {
        self.prepared()
            .map(|p| references(&p.formula))
            .unwrap_or_default()
    }

    /// Message table in use
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Run the formula and render the result
    pub fn execute(&self) -> Outcome {
        Outcome::from_result(self.calculate(), &self.messages)
    }

    /// Run the formula without rendering errors
    pub fn calculate(&self) -> Result<f64, CalcError> {
        let prepared = match &self.prepared {
            Ok(prepared) => prepared,
            Err(e) => return Err(CalcError::InvalidData(Some(e.clone()))),
        };

        let ctx = EvaluationContext::new(&prepared.vars, &self.registry);
        match &prepared.formula {
            NormalizedFormula::Single { eq } => self.price(eq, &ctx),
            NormalizedFormula::Conditional { branches } => {
                for (index, branch) in branches.iter().enumerate() {
                    let predicate = self.run(&branch.condition, &ctx)?;
                    if predicate.is_true() {
                        tracing::debug!(branch = index, "branch selected");
                        return self.price(&branch.result, &ctx);
                    }
                }
                tracing::debug!(branches = branches.len(), "no branch matched");
                Err(CalcError::UndefinedResult)
            }
        }
    }

    fn run(&self, expression: &Expression, ctx: &EvaluationContext) -> Result<Value, CalcError> {
        let ast = parse_expression(expression.text(), &self.registry)?;
        Ok(evaluate(&ast, ctx)?)
    }

    fn price(&self, expression: &Expression, ctx: &EvaluationContext) -> Result<f64, CalcError> {
        let value = self.run(expression, ctx)?.as_number();
        check_price(value)
    }
}

/// Apply the price policy to a computed value
pub fn check_price(value: f64) -> Result<f64, CalcError> {
    if !value.is_finite() {
        Err(CalcError::NotFinite(value))
    } else if value < 0.0 {
        Err(CalcError::NegativePrice(value))
    } else if value == 0.0 {
        Err(CalcError::ZeroPrice)
    } else {
        Ok(value)
    }
}
