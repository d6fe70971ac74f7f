//! Function whitelist enforcement.

use crate::{error_message, eval_oneline};
use kalkulator_formula::{
    parse_expression, Calculator, CalcError, EvalError, FunctionRegistry, RawFormula,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map};

#[test]
fn test_whitelisted_functions() {
    assert_eq!(
        eval_oneline(
            "ceil(1,2) + floor(1,8) + abs(0 - 3) + pow(2; 3) + sqrt(16) + min(4; 9)",
            json!({})
        ),
        kalkulator_formula::Outcome::Success(22.0)
    );
}

#[test]
fn test_unknown_function_is_a_syntax_error() {
    let calc = Calculator::new(&RawFormula::oneline("system(1)"), &Map::new());
    assert!(calc.is_ready());
    assert_eq!(
        calc.calculate(),
        Err(CalcError::Eval(EvalError::UnknownFunction {
            name: "system".into(),
            position: 0
        }))
    );
    assert_eq!(
        error_message(calc.execute()),
        "The function \"system\" does not exist around position 0."
    );
}

#[test]
fn test_constant_construction_is_rejected() {
    let message = error_message(eval_oneline("constant(\"PHP_INT_MAX\")", json!({})));
    assert!(message.starts_with("Unexpected character"), "{message}");

    // Without quotes the name is just an unbound variable
    let message = error_message(eval_oneline("constant(PHP_INT_MAX)", json!({})));
    assert_eq!(message, "Variable \"PHP_INT_MAX\" is not valid.");
}

#[test]
fn test_rejected_before_evaluation() {
    // The division by zero would fail first if arguments were evaluated
    let registry = FunctionRegistry::new();
    assert!(matches!(
        parse_expression("exec(1 / 0)", &registry),
        Err(EvalError::UnknownFunction { .. })
    ));
}
