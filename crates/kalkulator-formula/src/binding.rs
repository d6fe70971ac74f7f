//! Variable binding
//!
//! Builds the numeric [`VariableSet`] a formula is evaluated against and checks
//! that every `{name}` the formula references is present in it.

use ahash::AHashMap;
use lazy_regex::regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::PrepareError;
use crate::normalize::{escape_delimiter, unescape_delimiter};
use crate::shape::NormalizedFormula;

/// Numeric variables, keyed by delimiter-escaped name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    values: AHashMap<String, f64>,
}

impl VariableSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the numeric entries of a caller-supplied mapping
    ///
    /// Strings, booleans, null, arrays and objects are discarded.
    pub fn from_json(supplied: &Map<String, Value>) -> Self {
        supplied
            .iter()
            .filter_map(|(name, value)| value.as_f64().map(|n| (name.as_str(), n)))
            .collect()
    }

    /// Insert a binding; non-finite values are ignored
    pub fn insert(&mut self, name: &str, value: f64) {
        if value.is_finite() {
            self.values.insert(escape_delimiter(name), value);
        }
    }

    /// Value bound to an escaped name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Whether an escaped name is bound
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Escaped names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<'a> FromIterator<(&'a str, f64)> for VariableSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut set = VariableSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Names referenced as `{name}` in text, deduplicated and sorted
pub fn scan_references(text: &str) -> BTreeSet<String> {
    regex!(r"\{([^}]+)\}")
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Variables a prepared formula references
pub fn references(formula: &NormalizedFormula) -> BTreeSet<String> {
    scan_references(&formula.reference_source())
}

/// Bind the supplied mapping to a formula
///
/// Fails with [`PrepareError::MissingVariables`] listing every referenced
/// name (in its user-facing form) that has no numeric binding.
pub fn bind(
    formula: &NormalizedFormula,
    supplied: &Map<String, Value>,
) -> Result<VariableSet, PrepareError> {
    let vars = VariableSet::from_json(supplied);
    check_references(formula, &vars)?;
    Ok(vars)
}

/// Verify that every reference of a formula is bound in `vars`
pub fn check_references(
    formula: &NormalizedFormula,
    vars: &VariableSet,
) -> Result<(), PrepareError> {
    let missing: Vec<String> = references(formula)
        .into_iter()
        .filter(|name| !vars.contains(name))
        .map(|name| unescape_delimiter(&name))
        .collect();

    if missing.is_empty() {
        tracing::debug!(bound = vars.len(), "all referenced variables are bound");
        Ok(())
    } else {
        tracing::debug!(?missing, "formula references unbound variables");
        Err(PrepareError::MissingVariables(missing))
    }
}
