//! Calculation outcome handed back to the caller

use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::messages::Messages;

/// Tagged result of a calculation
///
/// Serializes as `{"status": "success", "payload": 12.5}` or
/// `{"status": "error", "payload": "Division by zero."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "lowercase")]
pub enum Outcome {
    Success(f64),
    Error(String),
}

impl Outcome {
    /// Render a calculation result through a message table
    pub fn from_result(result: Result<f64, CalcError>, messages: &Messages) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(e) => Outcome::Error(messages.describe(&e)),
        }
    }

    /// `"success"` or `"error"`
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Error(_) => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Computed price, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            Outcome::Success(value) => Some(*value),
            Outcome::Error(_) => None,
        }
    }

    /// Error message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Error(message) => Some(message),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
