//! Cell type

use crate::value::CellValue;

/// A single cell: a value plus optional formula and style metadata
///
/// The style field is opaque document metadata carried through unchanged;
/// the engine never interprets it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    /// The stored value
    pub value: CellValue,
    /// Formula string, if the cell carries one
    pub formula: Option<String>,
    /// Style/formatting metadata, passed through verbatim
    pub style: Option<serde_json::Value>,
}

impl Cell {
    /// Create a cell holding a value, with no formula or style
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            formula: None,
            style: None,
        }
    }

    /// Attach a formula string
    pub fn with_formula<S: Into<String>>(mut self, formula: S) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Attach style metadata
    pub fn with_style(mut self, style: serde_json::Value) -> Self {
        self.style = Some(style);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let cell = Cell::new(5.0)
            .with_formula("=A1+1")
            .with_style(serde_json::json!({"font": "bold"}));
        assert_eq!(cell.value, CellValue::Number(5.0));
        assert_eq!(cell.formula.as_deref(), Some("=A1+1"));
        assert!(cell.style.is_some());
    }

    #[test]
    fn test_default_is_empty_text() {
        let cell = Cell::default();
        assert!(cell.value.is_empty_text());
        assert!(cell.formula.is_none());
        assert!(cell.style.is_none());
    }
}
