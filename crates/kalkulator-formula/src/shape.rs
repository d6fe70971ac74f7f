//! Raw formula payloads, mode detection and shape validation

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::PrepareError;
use crate::normalize::{escape_delimiter, normalize};

/// Mode tag for single-expression formulas
pub const MODE_ONELINE: &str = "oneline";
/// Mode tag for conditional formulas
pub const MODE_CONDITIONAL: &str = "conditional";

/// Line type that carries a condition
pub const LINE_CONDITION: &str = "condition";
/// Line type for the fallback branch
pub const LINE_ELSE: &str = "else";

/// Formula as stored by the admin form
///
/// `expr` is kept as raw JSON: a string in `oneline` mode, a list of
/// `{type, if, then}` objects in `conditional` mode. Anything else is rejected
/// by [`validate_shape`], not by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFormula {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub expr: Value,
}

impl RawFormula {
    /// Single-expression formula
    pub fn oneline(expr: impl Into<String>) -> Self {
        Self {
            mode: MODE_ONELINE.to_string(),
            expr: Value::String(expr.into()),
        }
    }

    /// Conditional formula built from lines
    pub fn conditional(lines: impl IntoIterator<Item = RawLine>) -> Self {
        let lines = lines.into_iter().map(RawLine::into_json).collect();
        Self {
            mode: MODE_CONDITIONAL.to_string(),
            expr: Value::Array(lines),
        }
    }

    /// Parse the stored JSON form
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One line of a conditional formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "if", default)]
    pub condition: String,
    #[serde(rename = "then", default)]
    pub result: String,
}

impl RawLine {
    /// `if condition then result`
    pub fn condition(condition: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            kind: LINE_CONDITION.to_string(),
            condition: condition.into(),
            result: result.into(),
        }
    }

    /// Fallback line; its condition is always true
    pub fn otherwise(result: impl Into<String>) -> Self {
        Self {
            kind: LINE_ELSE.to_string(),
            condition: String::new(),
            result: result.into(),
        }
    }

    fn into_json(self) -> Value {
        json!({ "type": self.kind, "if": self.condition, "then": self.result })
    }
}

/// How a formula is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    Single,
    Conditional,
    Undefined,
}

/// Formula text before and after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
    text: String,
}

impl Expression {
    /// Normalize raw formula text
    pub fn new(raw: &str) -> Self {
        Self {
            source: escape_delimiter(raw),
            text: normalize(raw),
        }
    }

    /// Text with only the delimiter escaped; still carries `{…}` references
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Normalized text handed to the parser
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One conditional branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub condition: Expression,
    pub result: Expression,
}

/// Formula that passed shape validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedFormula {
    Single { eq: Expression },
    Conditional { branches: Vec<Branch> },
}

impl NormalizedFormula {
    /// Mode this formula was validated for
    pub fn mode(&self) -> EvaluationMode {
        match self {
            NormalizedFormula::Single { .. } => EvaluationMode::Single,
            NormalizedFormula::Conditional { .. } => EvaluationMode::Conditional,
        }
    }

    /// Pre-normalization text scanned for variable references
    pub fn reference_source(&self) -> String {
        match self {
            NormalizedFormula::Single { eq } => eq.source().to_string(),
            NormalizedFormula::Conditional { branches } => branches
                .iter()
                .flat_map(|b| [b.condition.source(), b.result.source()])
                .collect(),
        }
    }
}

/// Classify a raw formula by its declared mode
pub fn detect_mode(raw: &RawFormula) -> EvaluationMode {
    match raw.mode.as_str() {
        MODE_ONELINE => EvaluationMode::Single,
        MODE_CONDITIONAL => EvaluationMode::Conditional,
        _ => EvaluationMode::Undefined,
    }
}

/// Check the payload against the mode and normalize every text field
pub fn validate_shape(
    raw: &RawFormula,
    mode: EvaluationMode,
) -> Result<NormalizedFormula, PrepareError> {
    match mode {
        EvaluationMode::Single => match &raw.expr {
            Value::String(text) => Ok(NormalizedFormula::Single {
                eq: Expression::new(text),
            }),
            _ => Err(PrepareError::MissingExpression),
        },
        EvaluationMode::Conditional => {
            let lines = raw.expr.as_array().ok_or(PrepareError::NotAList)?;
            let branches = lines.iter().filter_map(prepare_line).collect();
            Ok(NormalizedFormula::Conditional { branches })
        }
        EvaluationMode::Undefined => Err(PrepareError::InvalidMode(raw.mode.clone())),
    }
}

fn prepare_line(line: &Value) -> Option<Branch> {
    let kind = line.get("type").and_then(Value::as_str)?;
    if kind != LINE_CONDITION && kind != LINE_ELSE {
        return None;
    }

    let mut condition = line_text(line, "if");
    if kind == LINE_ELSE && condition.trim().is_empty() {
        condition = "true".to_string();
    }

    Some(Branch {
        condition: Expression::new(&condition),
        result: Expression::new(&line_text(line, "then")),
    })
}

fn line_text(line: &Value, field: &str) -> String {
    match line.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
