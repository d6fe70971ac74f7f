//! Conditional formulas: ordered `{type, if, then}` branches.

use crate::{calculator, eval_json};
use kalkulator_formula::{Outcome, RawFormula, RawLine};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_first_true_branch_wins() {
    let formula = RawFormula::conditional(vec![
        RawLine::condition("1>2", "5"),
        RawLine::condition("1<2", "10"),
        // Never parsed: the branch above wins
        RawLine::condition("1<2", "10 +* ) garbage("),
    ]);
    assert_eq!(
        calculator(&formula, json!({})).execute(),
        Outcome::Success(10.0)
    );
}

#[test]
fn test_no_branch_matches() {
    let formula = RawFormula::conditional(vec![
        RawLine::condition("1>2", "5"),
        RawLine::condition("{a} > 100", "10"),
    ]);
    assert_eq!(
        calculator(&formula, json!({ "a": 1 })).execute(),
        Outcome::Error("Undefined result!".into())
    );
}

#[test]
fn test_empty_list_is_undefined() {
    assert_eq!(
        eval_json(r#"{"mode": "conditional", "expr": []}"#, json!({})),
        Outcome::Error("Undefined result!".into())
    );
}

#[test]
fn test_else_branch() {
    let formula = RawFormula::conditional(vec![
        RawLine::condition("{area} > 10", "{area} * 8"),
        RawLine::otherwise("{area} * 10"),
    ]);
    assert_eq!(
        calculator(&formula, json!({ "area": 20 })).execute(),
        Outcome::Success(160.0)
    );
    assert_eq!(
        calculator(&formula, json!({ "area": 4 })).execute(),
        Outcome::Success(40.0)
    );
}

#[test]
fn test_unknown_line_types_are_skipped() {
    let outcome = eval_json(
        r#"{"mode": "conditional", "expr": [
            {"type": "comment", "if": "1 +* 2", "then": "x"},
            {"type": "condition", "if": "{a} >= 2 and {a} < 5", "then": "{a} * 3"}
        ]}"#,
        json!({ "a": 3 }),
    );
    assert_eq!(outcome, Outcome::Success(9.0));
}

#[test]
fn test_predicate_must_be_strictly_true() {
    // A truthy number is not the boolean `true`
    let formula = RawFormula::conditional(vec![
        RawLine::condition("{a}", "1"),
        RawLine::condition("{a} == 5", "2"),
    ]);
    assert_eq!(
        calculator(&formula, json!({ "a": 5 })).execute(),
        Outcome::Success(2.0)
    );
}

#[test]
fn test_predicate_errors_abort() {
    let formula = RawFormula::conditional(vec![
        RawLine::condition("{a} / {b} > 1", "1"),
        RawLine::otherwise("2"),
    ]);
    assert_eq!(
        calculator(&formula, json!({ "a": 1, "b": 0 })).execute(),
        Outcome::Error("Division by zero.".into())
    );
}

#[test]
fn test_winning_branch_goes_through_price_policy() {
    let formula = RawFormula::conditional(vec![RawLine::condition("true", "{a} - 10")]);
    assert_eq!(
        calculator(&formula, json!({ "a": 4 })).execute(),
        Outcome::Error("The price is less than zero. =-6".into())
    );
}

#[test]
fn test_references_span_all_branches() {
    let formula = RawFormula::conditional(vec![
        RawLine::condition("{a} > 1", "{b}"),
        RawLine::otherwise("{c}"),
    ]);
    let calc = calculator(&formula, json!({ "a": 2, "b": 3 }));
    assert!(!calc.is_ready());
    assert_eq!(calc.execute(), Outcome::Error("Invalid data!".into()));
}
