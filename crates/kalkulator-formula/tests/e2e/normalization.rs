//! Text rewriting applied before parsing.

use crate::eval_oneline;
use kalkulator_formula::{normalize, Outcome};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_delimiter_round_trip() {
    assert_eq!(
        eval_oneline("{field:name} * 2", json!({ "field:name": 21 })),
        Outcome::Success(42.0)
    );
}

#[test]
fn test_html_escaped_formula() {
    assert_eq!(
        eval_oneline("{a} &gt; 2 &amp;&amp; {a} &lt; 5", json!({ "a": 3 })),
        Outcome::Success(1.0)
    );
}

#[test]
fn test_decimal_comma() {
    assert_eq!(
        eval_oneline("{a} * 1,5", json!({ "a": 4 })),
        Outcome::Success(6.0)
    );
}

#[test]
fn test_semicolon_separates_arguments() {
    assert_eq!(
        eval_oneline("max({a}; {b}; 3,5)", json!({ "a": 1, "b": 2 })),
        Outcome::Success(3.5)
    );
    assert_eq!(
        eval_oneline("round(1,955; 2)", json!({})),
        Outcome::Success(1.96)
    );
}

#[test]
fn test_normalize_is_pure() {
    let text = "round({field:price} * 1,23; 2)";
    assert_eq!(normalize(text), "round(field__p__price * 1.23, 2)");
    assert_eq!(normalize(text), normalize(text));
}
