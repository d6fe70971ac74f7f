//! Message table for calculation errors
//!
//! Every error that reaches the caller is rendered through a [`Messages`]
//! table keyed by [`MessageKind`]. A table is injected into each
//! [`Calculator`](crate::Calculator); callers that want other wording (or
//! another language) load their own and share it behind an `Arc`.
//!
//! Templates may contain `{detail}`, which is replaced by the error's detail
//! text: the parser message for syntax errors, the computed value for a
//! negative price, and so on.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::CalcError;

/// Placeholder replaced with the error detail
pub const DETAIL_PLACEHOLDER: &str = "{detail}";

static DEFAULT_MESSAGES: Lazy<Arc<Messages>> = Lazy::new(|| Arc::new(Messages::default()));

/// Kinds of reportable errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    InvalidData,
    InvalidMode,
    InvalidShape,
    MissingVariables,
    SyntaxError,
    DivisionByZero,
    NegativePrice,
    ZeroPrice,
    NotFinite,
    UndefinedResult,
}

impl MessageKind {
    /// All kinds, in declaration order
    pub const ALL: [MessageKind; 10] = [
        MessageKind::InvalidData,
        MessageKind::InvalidMode,
        MessageKind::InvalidShape,
        MessageKind::MissingVariables,
        MessageKind::SyntaxError,
        MessageKind::DivisionByZero,
        MessageKind::NegativePrice,
        MessageKind::ZeroPrice,
        MessageKind::NotFinite,
        MessageKind::UndefinedResult,
    ];

    /// Built-in English template
    pub fn default_template(self) -> &'static str {
        match self {
            MessageKind::InvalidData => "Invalid data!",
            MessageKind::InvalidMode => "Invalid calculation mode.",
            MessageKind::InvalidShape => "Prepared expression has incorrect type.",
            MessageKind::MissingVariables => "{detail}",
            MessageKind::SyntaxError => "{detail}",
            MessageKind::DivisionByZero => "Division by zero.",
            MessageKind::NegativePrice => "The price is less than zero. ={detail}",
            MessageKind::ZeroPrice => "The price is equal zero.",
            MessageKind::NotFinite => "The price is not a finite number.",
            MessageKind::UndefinedResult => "Undefined result!",
        }
    }
}

/// Swappable message table
///
/// Kinds without an entry fall back to [`MessageKind::default_template`], so a
/// partial table loaded from JSON only needs the entries it overrides:
///
/// ```rust
/// use kalkulator_formula::{MessageKind, Messages};
///
/// let messages = Messages::from_json(r#"{"zero_price": "Cena wynosi zero."}"#).unwrap();
/// assert_eq!(messages.template(MessageKind::ZeroPrice), "Cena wynosi zero.");
/// assert_eq!(messages.template(MessageKind::DivisionByZero), "Division by zero.");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages {
    templates: AHashMap<MessageKind, String>,
}

impl Messages {
    /// Shared built-in table
    pub fn shared_default() -> Arc<Messages> {
        Arc::clone(&DEFAULT_MESSAGES)
    }

    /// Parse a (possibly partial) table from a JSON object
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Override the template for one kind
    pub fn set(&mut self, kind: MessageKind, template: impl Into<String>) -> &mut Self {
        self.templates.insert(kind, template.into());
        self
    }

    /// Template for a kind, falling back to the built-in one
    pub fn template(&self, kind: MessageKind) -> &str {
        self.templates
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_template())
    }

    /// Render a template with its detail text
    pub fn render(&self, kind: MessageKind, detail: &str) -> String {
        self.template(kind).replace(DETAIL_PLACEHOLDER, detail)
    }

    /// Render the message for a calculation error
    pub fn describe(&self, error: &CalcError) -> String {
        self.render(error.kind(), &error.detail())
    }
}
