//! Single-expression (`oneline`) formulas.

use crate::{calculator, error_message, eval_json, eval_oneline};
use kalkulator_formula::{Outcome, PrepareError, RawFormula};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_simple_addition() {
    assert_eq!(eval_oneline("2 + 2", json!({})), Outcome::Success(4.0));
}

#[test]
fn test_variables_are_substituted() {
    let outcome = eval_oneline(
        "{width} * {height} / 10000 * {price}",
        json!({ "width": 200, "height": 150, "price": 45.5 }),
    );
    assert_eq!(outcome, Outcome::Success(136.5));
}

#[test]
fn test_missing_variable_fails_construction() {
    let calc = calculator(&RawFormula::oneline("{width}"), json!({}));
    assert!(!calc.is_ready());
    assert_eq!(
        calc.prepare_error(),
        Some(&PrepareError::MissingVariables(vec!["width".into()]))
    );
    assert_eq!(calc.execute(), Outcome::Error("Invalid data!".into()));
}

#[test]
fn test_non_numeric_variables_are_discarded() {
    let calc = calculator(
        &RawFormula::oneline("{a} + {b} + {c} + {d}"),
        json!({ "a": "12", "b": true, "c": null, "d": [1] }),
    );
    assert_eq!(
        calc.prepare_error(),
        Some(&PrepareError::MissingVariables(vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into()
        ]))
    );
}

#[test]
fn test_unreferenced_variables_are_ignored() {
    assert_eq!(
        eval_oneline("10", json!({ "unused": "text", "other": 3 })),
        Outcome::Success(10.0)
    );
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        eval_oneline("1/0", json!({})),
        Outcome::Error("Division by zero.".into())
    );
    assert_eq!(
        eval_oneline("{a} % {b}", json!({ "a": 10, "b": 0 })),
        Outcome::Error("Division by zero.".into())
    );
}

#[test]
fn test_price_policy() {
    assert_eq!(
        eval_oneline("0 - 5", json!({})),
        Outcome::Error("The price is less than zero. =-5".into())
    );
    assert_eq!(
        eval_oneline("{x} - {x}", json!({ "x": 7 })),
        Outcome::Error("The price is equal zero.".into())
    );
    assert_eq!(eval_oneline("5", json!({})), Outcome::Success(5.0));
    assert_eq!(
        eval_oneline("sqrt(0 - 4)", json!({})),
        Outcome::Error("The price is not a finite number.".into())
    );
}

#[test]
fn test_syntax_error_message() {
    assert_eq!(
        error_message(eval_oneline("2 +", json!({}))),
        "Unexpected token \"end of expression\" around position 3 for expression `2 +`."
    );
}

#[test]
fn test_idempotent_execution() {
    let calc = calculator(
        &RawFormula::oneline("round({a} * 1.23; 2)"),
        json!({ "a": 19.99 }),
    );
    let first = calc.execute();
    let second = calc.execute();
    assert_eq!(first, second);
    assert_eq!(first, Outcome::Success(24.59));
}

#[test]
fn test_stored_json_formula() {
    let outcome = eval_json(
        r#"{"mode": "oneline", "expr": "{qty} * 2,5"}"#,
        json!({ "qty": 4 }),
    );
    assert_eq!(outcome, Outcome::Success(10.0));
}

#[test]
fn test_invalid_shapes() {
    for formula in [
        r#"{"mode": "oneline", "expr": 42}"#,
        r#"{"mode": "oneline"}"#,
        r#"{"mode": "conditional", "expr": "1"}"#,
        r#"{"mode": "Oneline", "expr": "1"}"#,
        r#"{"expr": "1"}"#,
    ] {
        assert_eq!(
            eval_json(formula, json!({})),
            Outcome::Error("Invalid data!".into()),
            "{formula}"
        );
    }
}

#[test]
fn test_deeply_nested_formula_is_an_error() {
    for expr in [
        format!("{}1{}", "(".repeat(1000), ")".repeat(1000)),
        format!("{}1", "-".repeat(1000)),
    ] {
        let message = error_message(eval_oneline(&expr, json!({})));
        assert!(
            message.starts_with("Expression is nested too deeply"),
            "{message}"
        );
    }

    let nested = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(eval_oneline(&nested, json!({})), Outcome::Success(1.0));
}

#[test]
fn test_overlong_formula_is_an_error() {
    let expr = vec!["{a}"; 10_000].join(" + ");
    let message = error_message(eval_oneline(&expr, json!({ "a": 1 })));
    assert!(
        message.starts_with("Expression has too many operators"),
        "{message}"
    );
}

#[test]
fn test_round_keeps_huge_values() {
    assert_eq!(
        eval_oneline("round(1e307; 5)", json!({})),
        Outcome::Success(1e307)
    );
}
