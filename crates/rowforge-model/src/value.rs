//! Cell value type

use std::fmt;

/// A cell value: numeric or text
///
/// Workbook documents tag every stored value as numeric (`n`) or string
/// (`s`); the enum variant carries that tag.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl CellValue {
    /// Create a numeric value
    pub fn number(n: f64) -> Self {
        CellValue::Number(n)
    }

    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// The document type tag for this value (`'n'` or `'s'`)
    pub fn type_tag(&self) -> char {
        match self {
            CellValue::Number(_) => 'n',
            CellValue::Text(_) => 's',
        }
    }

    /// Get the numeric value, if numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// Get the text value, if text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Number(_) => None,
            CellValue::Text(s) => Some(s),
        }
    }

    /// Check for the empty text value
    pub fn is_empty_text(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}
