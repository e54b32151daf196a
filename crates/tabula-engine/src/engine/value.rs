//! Computed cell values and in-band error codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes stored as a cell's computed value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// The formula reads itself, directly or through other formulas.
    Circular,
    /// An expression referenced a cell with no value.
    Ref,
    /// The expression could not be evaluated.
    Error,
    /// A call named a function that is not registered.
    UnknownFunction(String),
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::Circular => f.write_str("#CIRCULAR!"),
            CellError::Ref => f.write_str("#REF!"),
            CellError::Error => f.write_str("#ERROR"),
            CellError::UnknownFunction(name) => write!(f, "#ERROR: Unknown function {}", name),
        }
    }
}

/// The computed value of a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    Text(String),
    Error(CellError),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text form used for display and by the text functions. Null renders empty.
    pub fn as_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Error(e) => e.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<CellError> for Value {
    fn from(e: CellError) -> Self {
        Value::Error(e)
    }
}

/// Format a number for display: shortest round-trip text, no trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid rendering negative zero as "-0".
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Parse a finite decimal number, tolerating surrounding whitespace.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Computed value of a literal (non-formula) entry: a number if the text is
/// numeric, otherwise the text unchanged.
pub fn coerce_literal(raw: &str) -> Value {
    match parse_number(raw) {
        Some(n) => Value::Number(n),
        None => Value::Text(raw.to_string()),
    }
}
