//! Property tests for normalization and calculation.

use kalkulator_formula::{
    escape_delimiter, normalize, unescape_delimiter, Calculator, Outcome, RawFormula,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn vars(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

proptest! {
    #[test]
    fn test_normalized_text_has_no_braces_or_delimiter(text in ".{0,64}") {
        let normalized = normalize(&text);
        prop_assert!(!normalized.contains('{'), "normalized text contains '{{'");
        prop_assert!(!normalized.contains('}'), "normalized text contains '}}'");
        prop_assert!(!normalized.contains(':'));
    }

    #[test]
    fn test_delimiter_escape_round_trip(name in "[a-z]{1,8}(:[a-z]{1,8}){0,3}") {
        prop_assert_eq!(unescape_delimiter(&escape_delimiter(&name)), name);
    }

    #[test]
    fn test_addition_matches_integer_arithmetic(a in 1i64..1_000_000, b in 1i64..1_000_000) {
        let calc = Calculator::new(
            &RawFormula::oneline("{a} + {b}"),
            &vars(json!({ "a": a, "b": b })),
        );
        prop_assert_eq!(calc.execute(), Outcome::Success((a + b) as f64));
    }

    #[test]
    fn test_sign_policy(a in -1000i64..1000) {
        let outcome = Calculator::new(
            &RawFormula::oneline("{a}"),
            &vars(json!({ "a": a })),
        )
        .execute();
        match a {
            a if a > 0 => prop_assert_eq!(outcome, Outcome::Success(a as f64)),
            0 => prop_assert_eq!(outcome, Outcome::Error("The price is equal zero.".into())),
            a => prop_assert_eq!(
                outcome,
                Outcome::Error(format!("The price is less than zero. ={a}"))
            ),
        }
    }

    #[test]
    fn test_execution_is_idempotent(expr in "[0-9a-z+*/%() -]{0,24}", x in -50.0f64..50.0) {
        let calc = Calculator::new(
            &RawFormula::oneline(expr),
            &vars(json!({ "x": x })),
        );
        prop_assert_eq!(calc.execute(), calc.execute());
    }
}
