//! Common utilities for E2E tests.

use kalkulator_formula::{Calculator, Outcome, RawFormula};
use serde_json::{Map, Value};

/// Turn a `json!({...})` literal into a variable mapping.
pub fn vars(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected a JSON object, got {other}"),
    }
}

/// Build a calculator for a raw formula.
pub fn calculator(formula: &RawFormula, supplied: Value) -> Calculator {
    Calculator::new(formula, &vars(supplied))
}

/// Evaluate a single-expression formula.
pub fn eval_oneline(expr: &str, supplied: Value) -> Outcome {
    calculator(&RawFormula::oneline(expr), supplied).execute()
}

/// Evaluate a formula stored as JSON.
pub fn eval_json(formula: &str, supplied: Value) -> Outcome {
    let formula = RawFormula::from_json(formula).expect("formula JSON should parse");
    calculator(&formula, supplied).execute()
}

/// Unwrap an error message, panicking on success.
pub fn error_message(outcome: Outcome) -> String {
    match outcome {
        Outcome::Error(message) => message,
        other => panic!("Expected Error, got {other:?}"),
    }
}
